use serde::Serialize;

#[derive(Serialize)]
pub struct BeginTransferRequest<'a> {
    pub path: &'a str,
}

#[derive(Serialize)]
pub struct TextMessageRequest<'a> {
    pub text: &'a str,
}

#[derive(Serialize)]
pub struct EventStreamQuery {
    pub since: u64,
    pub timeout: u64,
}
