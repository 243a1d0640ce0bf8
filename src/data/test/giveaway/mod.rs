use crate::{
    data::{GiveawayRepository, StoreError},
    model::GiveawayState,
};
use test_utils::{builder::TestBuilder, factory};

mod find;
mod save;
