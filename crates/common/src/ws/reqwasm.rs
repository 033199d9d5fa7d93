use ::reqwasm::websocket::Message;

use super::{decode, ClientMsg, ServerMsg, TryFromError};

impl TryFrom<&ClientMsg> for Message {
    type Error = TryFromError;

    fn try_from(val: &ClientMsg) -> Result<Self, Self::Error> {
        Ok(Message::Text(serde_json::to_string(val)?))
    }
}

impl TryFrom<Message> for ServerMsg {
    type Error = TryFromError;

    fn try_from(value: Message) -> Result<Self, TryFromError> {
        match value {
            Message::Text(text) => decode(text.as_bytes()),
            Message::Bytes(bytes) => decode(&bytes),
        }
    }
}
