use strum_macros::Display;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum Level {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

/// Transient user facing messages. Views push, the front end drains and renders.
#[derive(Clone)]
pub struct Notifier {
    sender: flume::Sender<Notification>,
}

impl Notifier {
    pub fn new() -> (Self, flume::Receiver<Notification>) {
        let (sender, receiver) = flume::unbounded();

        (Self { sender }, receiver)
    }

    pub fn success(&self, message: &str) {
        self.push(Level::Success, message)
    }

    pub fn info(&self, message: &str) {
        self.push(Level::Info, message)
    }

    pub fn warning(&self, message: &str) {
        self.push(Level::Warning, message)
    }

    pub fn error(&self, message: &str) {
        self.push(Level::Error, message)
    }

    fn push(&self, level: Level, message: &str) {
        // Nobody listening is not an error, the message is simply dropped
        let _ = self.sender.send(Notification {
            level,
            message: message.to_string(),
        });
    }
}
