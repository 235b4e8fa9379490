// Crate implementing the Engineering Principles of Channels
//
// Every channel is split into a [`SendChannel`] and a [`ReceiveChannel`].
// Only a sender can close its side and closing consumes the handle, so a
// handle that closed can never be used to send again. The channel is
// considered closed for the receiver once every sender handle has been
// closed or dropped and the buffered messages have been drained.

mod channels;
mod errors;

pub use channels::*;
pub use errors::*;
