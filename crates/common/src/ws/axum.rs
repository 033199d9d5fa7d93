use ::axum::extract::ws::Message;

use super::{decode, ClientMsg, ServerMsg, TryFromError};

impl TryFrom<&ServerMsg> for Message {
    type Error = TryFromError;

    fn try_from(val: &ServerMsg) -> Result<Self, Self::Error> {
        Ok(Message::Text(serde_json::to_string(val)?))
    }
}

impl TryFrom<Message> for ClientMsg {
    type Error = TryFromError;

    fn try_from(value: Message) -> Result<Self, TryFromError> {
        match value {
            Message::Text(text) => decode(text.as_bytes()),
            Message::Binary(bytes) => decode(&bytes),
            other => Err(TryFromError::InvalidMessageType(format!("{other:?}"))),
        }
    }
}
