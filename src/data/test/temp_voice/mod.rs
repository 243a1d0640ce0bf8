use crate::{
    data::{StoreError, TempVoiceRepository},
    model::TempVoiceState,
};
use chrono::{Duration, Utc};
use test_utils::{builder::TestBuilder, factory};

mod save;
