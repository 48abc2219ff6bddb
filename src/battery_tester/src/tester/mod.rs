pub mod layout;
pub mod machine;
pub mod multiplexer;
pub mod record;
pub mod settings;
pub mod state;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TesterError {
    LayoutMismatch,
    TooManyChannels,
    InvalidSlot,
    InvalidMultiplexerOffset,
}
