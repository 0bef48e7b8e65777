use {
    derive_more::Display,
    hex::FromHex,
    rand::RngCore,
    serde::{
        Deserialize, Serialize, Serializer,
        de::{self, Deserializer},
        ser::SerializeSeq,
    },
    serde_json::Value,
    snafu::Snafu,
    std::{
        fmt::{self, Formatter},
        str::FromStr,
    },
};

pub use {
    authorize::Authorize,
    error::{InternalError, JsonRpcError, Result},
    extranonce::Extranonce,
    job_id::JobId,
    message::{Id, Message},
    notify::Notify,
    set_difficulty::SetDifficulty,
    submit::Submit,
    subscribe::{MAX_EXTRANONCE2_SIZE, Subscribe, SubscribeResult},
};

mod authorize;
mod error;
mod extranonce;
mod job_id;
mod message;
mod notify;
mod set_difficulty;
mod submit;
mod subscribe;
