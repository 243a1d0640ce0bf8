use crate::{
    data::{RoleMenuRepository, StoreError},
    model::RoleMenuState,
};
use test_utils::{builder::TestBuilder, factory};

mod save;
