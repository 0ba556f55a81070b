//! Channel roles, data types and channel definitions
//!
//! This module defines what a channel *is* (its role and the type of data bound
//! to it) and how a user-supplied definition is completed.

mod def;
mod types;

pub use def::{
    complete_channel_def, complete_channel_def_with, Bin, BinParams, ChannelDef,
    CompleteChannelDef, CompleteFieldDef, CompleteValueDef, CompletionOptions, Configurable,
    Disabled, FieldDef, ValueDef,
};
pub use types::{ChannelType, DataType};
