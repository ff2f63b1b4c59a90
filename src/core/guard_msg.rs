// Author: Dustin Pilgrim
// License: MIT

use tokio::sync::oneshot;

use crate::core::{
    error::{PinError, VerifyError},
    events::Event,
    info::InfoSnapshot,
    state::Unlocked,
};

pub type PinReply = oneshot::Sender<Result<Unlocked, PinError>>;

#[derive(Debug)]
pub enum GuardMsg {
    Event(Event),

    SubmitPin {
        candidate: String,
        reply: PinReply,
    },

    /// Posted by the verification task back into the loop.
    VerificationDone {
        outcome: Result<bool, VerifyError>,
        reply: PinReply,
    },

    RequestLogout {
        reply: oneshot::Sender<Result<String, String>>,
    },

    GetInfo {
        reply: oneshot::Sender<InfoSnapshot>,
    },

    SetRoute {
        route: String,
        reply: oneshot::Sender<Result<String, String>>,
    },

    Stop {
        reply: oneshot::Sender<Result<String, String>>,
    },
}
