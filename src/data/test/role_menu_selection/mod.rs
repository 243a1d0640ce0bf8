use crate::data::{RoleMenuSelectionRepository, StoreError};
use test_utils::{builder::TestBuilder, factory};

mod upsert;
