use crate::data::{GuildConfigRepository, StoreError};
use test_utils::builder::TestBuilder;

mod upsert;
