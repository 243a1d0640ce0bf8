use crate::{
    data::{StoreError, TicketRepository},
    model::TicketState,
};
use test_utils::{builder::TestBuilder, factory};

mod create;
mod find;
mod save;
