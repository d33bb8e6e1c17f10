use super::test_helpers::*;
use super::*;
use crate::config::EntryFailurePolicy;
use crate::error::{FetchError, IndexError};
use crate::types::ResourceKind;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};
