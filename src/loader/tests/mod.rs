use super::test_helpers::{
    MockFetcher, create_observed_loader, create_test_loader, locator, test_config, wait_done,
};
use super::*;
use crate::error::Error;
use crate::types::ProgressSnapshot;
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

mod directory;
