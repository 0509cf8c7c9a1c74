#![allow(dead_code)]

use async_trait::async_trait;
use gembot::providers::base::{ChatBackend, ChatHistory, Turn};
use gembot::utils::media::Attachment;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Scriptable in-memory backend: echoes a canned reply, counts calls, and can
/// be flipped into a failing state to exercise error paths.
pub struct FakeBackend {
    reply: RwLock<String>,
    model: RwLock<String>,
    failing: AtomicBool,
    pub chat_calls: AtomicUsize,
    pub once_calls: AtomicUsize,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::with_reply("fake reply")
    }

    pub fn with_reply(reply: &str) -> Self {
        Self {
            reply: RwLock::new(reply.to_string()),
            model: RwLock::new("fake-model".to_string()),
            failing: AtomicBool::new(false),
            chat_calls: AtomicUsize::new(0),
            once_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_reply(&self, reply: &str) {
        *self.reply.write().unwrap() = reply.to_string();
    }
}

#[async_trait]
impl ChatBackend for FakeBackend {
    async fn send(&self, history: &mut ChatHistory, prompt: &str) -> anyhow::Result<String> {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("backend unavailable");
        }
        let reply = self.reply.read().unwrap().clone();
        history.push(Turn::user(prompt));
        history.push(Turn::model(reply.clone()));
        Ok(reply)
    }

    async fn generate_once(
        &self,
        _attachment: &Attachment,
        _prompt: &str,
    ) -> anyhow::Result<String> {
        self.once_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("backend unavailable");
        }
        Ok(self.reply.read().unwrap().clone())
    }

    fn model_name(&self) -> String {
        self.model.read().unwrap().clone()
    }

    fn set_model(&self, model: String) {
        *self.model.write().unwrap() = model;
    }
}

/// Encode a tiny valid PNG for attachment tests.
pub fn tiny_png() -> Vec<u8> {
    let img = image::RgbaImage::new(1, 1);
    let mut buf = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    buf.into_inner()
}
