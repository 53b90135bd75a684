//! The assistant engine: routes inbound events to chat, commands, or the
//! upload pipeline, and shapes everything going back out.
//!
//! The engine owns no locks of its own. Memory atomicity lives in the
//! store, transport details live in the platform, and every provider call
//! happens outside both. A failed memory write is logged and the exchange
//! continues; a failed provider call becomes a worded reply and is never
//! retried.

use std::sync::Arc;
use std::time::Instant;

use ironwren_core::{
    AnalysisRecord, Attachment, ChatMessage, CompletionRequest, ConversationKey, Error,
    InboundEvent, MemoryStore, OutboundFile, OutboundMessage, Platform, Provider, ProviderError,
    Scope, Turn,
};
use tracing::{debug, info, warn};

use crate::commands::{self, Command, help_text};
use crate::composer::PromptComposer;
use crate::dispatch::{provider_error_reply, rejection_reply, truncate_plain, truncate_rich};
use crate::intake::{FilePipeline, strip_code_fences};
use crate::persona::{ASSISTANT_NAME, PERSONA_PREAMBLE, Task};
use crate::scaffold::{ScaffoldKind, services_reply};
use crate::util::{clean_content, format_uptime};

const DEFAULT_CHAT_MODEL: &str = "llama-3.1-8b-instant";
const DEFAULT_ANALYZE_MODEL: &str = "mixtral-8x7b-32768";
const DEFAULT_PREFIX: &str = "!";

/// The assistant. One instance serves every conversation.
pub struct Assistant {
    provider: Arc<dyn Provider>,
    store: Arc<dyn MemoryStore>,
    platform: Arc<dyn Platform>,
    composer: PromptComposer,
    pipeline: FilePipeline,
    chat_model: String,
    analyze_model: String,
    command_prefix: String,
    started_at: Instant,
}

impl Assistant {
    pub fn new(
        provider: Arc<dyn Provider>,
        store: Arc<dyn MemoryStore>,
        platform: Arc<dyn Platform>,
    ) -> Self {
        Self {
            composer: PromptComposer::new(store.clone()),
            pipeline: FilePipeline::new(
                provider.clone(),
                DEFAULT_CHAT_MODEL,
                DEFAULT_ANALYZE_MODEL,
            ),
            provider,
            store,
            platform,
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            analyze_model: DEFAULT_ANALYZE_MODEL.to_string(),
            command_prefix: DEFAULT_PREFIX.to_string(),
            started_at: Instant::now(),
        }
    }

    /// Override the chat and code models.
    pub fn with_models(
        mut self,
        chat_model: impl Into<String>,
        analyze_model: impl Into<String>,
    ) -> Self {
        self.chat_model = chat_model.into();
        self.analyze_model = analyze_model.into();
        self.pipeline =
            FilePipeline::new(self.provider.clone(), &self.chat_model, &self.analyze_model);
        self
    }

    /// Override the command prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.command_prefix = prefix.into();
        self
    }

    /// Drain the platform's event stream until it closes.
    pub async fn run(&self) -> ironwren_core::Result<()> {
        let mut events = self.platform.start().await.map_err(Error::from)?;
        info!(platform = self.platform.name(), "Assistant listening");
        while let Some(item) = events.recv().await {
            match item {
                Ok(event) => self.handle_event(event).await,
                Err(error) => warn!(error = %error, "Platform delivered an error"),
            }
        }
        info!("Event stream closed, assistant stopping");
        Ok(())
    }

    /// Route one inbound event. Never fails; every failure path ends in a
    /// log line, a worded reply, or both.
    pub async fn handle_event(&self, event: InboundEvent) {
        if !self.platform.is_allowed(&event.author_id) {
            debug!(author_id = %event.author_id, "Ignoring event from unlisted author");
            return;
        }
        self.record_request(&event.author_id).await;

        if !event.attachments.is_empty() {
            self.handle_attachments(&event).await;
            return;
        }

        if let Some(command) = commands::parse(&self.command_prefix, &event.content) {
            self.dispatch_command(&event, command).await;
            return;
        }

        if self.should_chat(&event).await {
            self.chat(&event, &event.content).await;
        }
    }

    fn conversation_key(&self, event: &InboundEvent) -> ConversationKey {
        if event.is_direct() {
            ConversationKey::user(&event.author_id)
        } else {
            ConversationKey::channel(&event.channel_id)
        }
    }

    /// Direct messages always chat; guild messages only in the bound
    /// auto-response channel.
    async fn should_chat(&self, event: &InboundEvent) -> bool {
        if event.is_direct() {
            return true;
        }
        let Some(guild_id) = event.guild_id.as_deref() else {
            return false;
        };
        match self.store.auto_channel(guild_id).await {
            Ok(Some(channel)) => channel == event.channel_id,
            Ok(None) => false,
            Err(error) => {
                warn!(guild_id, error = %error, "Auto-channel lookup failed");
                false
            }
        }
    }

    /// One conversational exchange: compose, complete, remember, reply.
    /// Turns are appended only after the provider answers, so a failed call
    /// leaves memory exactly as it was.
    async fn chat(&self, event: &InboundEvent, content: &str) {
        let cleaned = clean_content(content);
        if cleaned.is_empty() {
            return;
        }
        let key = self.conversation_key(event);
        let input = match key.scope() {
            Scope::Channel => Turn::named_user(event.author_name(), &cleaned),
            Scope::User => Turn::user(&cleaned),
        };

        let messages = self.composer.compose(&key, &input).await;
        debug!(key = %key, messages = messages.len(), "Dispatching chat completion");
        match self.complete_task(Task::Chat, messages).await {
            Ok(reply) => {
                self.append(&key, input).await;
                self.append(&key, Turn::assistant(&reply)).await;
                self.send(&event.channel_id, truncate_plain(&reply)).await;
            }
            Err(error) => {
                warn!(key = %key, error = %error, "Chat completion failed");
                self.send(&event.channel_id, provider_error_reply(&error))
                    .await;
            }
        }
    }

    async fn handle_attachments(&self, event: &InboundEvent) {
        let fixing = matches!(
            commands::parse(&self.command_prefix, &event.content),
            Some(Command::Fix { .. })
        );
        info!(
            count = event.attachments.len(),
            channel_id = %event.channel_id,
            fixing,
            "Processing attachments"
        );
        // Attachments run one at a time; a rejection or failure on one
        // never touches its siblings.
        for attachment in &event.attachments {
            if fixing {
                self.fix_attachment(event, attachment).await;
            } else {
                self.analyze_attachment(event, attachment).await;
            }
        }
    }

    async fn analyze_attachment(&self, event: &InboundEvent, attachment: &Attachment) {
        if let Some(rejection) = attachment.rejection() {
            info!(
                filename = %attachment.filename,
                verdict = ?attachment.classify(),
                "Upload refused"
            );
            self.send(&event.channel_id, rejection_reply(&rejection))
                .await;
            self.record_analysis(attachment, &event.author_id).await;
            return;
        }

        let notice = self
            .send(
                &event.channel_id,
                format!("\u{1f50d} Analyzing `{}`...", attachment.filename),
            )
            .await;
        let text = match self.pipeline.analyze(attachment).await {
            Ok(analysis) => truncate_rich(&format!(
                "\u{1f50d} **Analysis of `{}`**\n\n{analysis}",
                attachment.filename
            )),
            Err(rejection) => rejection_reply(&rejection),
        };
        self.replace_or_send(event, notice, text).await;
        self.record_analysis(attachment, &event.author_id).await;
    }

    async fn fix_attachment(&self, event: &InboundEvent, attachment: &Attachment) {
        if let Some(rejection) = attachment.rejection() {
            self.send(&event.channel_id, rejection_reply(&rejection))
                .await;
            self.record_analysis(attachment, &event.author_id).await;
            return;
        }

        let notice = self
            .send(
                &event.channel_id,
                format!("\u{1f527} Rewriting `{}`...", attachment.filename),
            )
            .await;
        match self.pipeline.auto_fix(attachment).await {
            Ok(fixed) => {
                let message = OutboundMessage::with_file(
                    format!("\u{2705} Here's the corrected `{}`.", attachment.filename),
                    OutboundFile::new(attachment.fixed_filename(), fixed.into_bytes()),
                );
                match self.platform.reply(&event.channel_id, message).await {
                    Ok(_) => {
                        if let Some(id) = notice {
                            if let Err(error) =
                                self.platform.delete_message(&event.channel_id, &id).await
                            {
                                debug!(error = %error, "Could not delete progress notice");
                            }
                        }
                    }
                    Err(error) => {
                        warn!(
                            channel_id = %event.channel_id,
                            error = %error,
                            "Fixed file delivery failed"
                        );
                    }
                }
                self.record_analysis(attachment, &event.author_id).await;
            }
            Err(Error::File(rejection)) => {
                self.replace_or_send(event, notice, rejection_reply(&rejection))
                    .await;
                self.record_analysis(attachment, &event.author_id).await;
            }
            Err(Error::Provider(provider_error)) => {
                self.replace_or_send(event, notice, provider_error_reply(&provider_error))
                    .await;
            }
            Err(error) => {
                warn!(filename = %attachment.filename, error = %error, "Rewrite failed");
                self.replace_or_send(
                    event,
                    notice,
                    "\u{26a0}\u{fe0f} Something went wrong with that file.".to_string(),
                )
                .await;
            }
        }
    }

    async fn dispatch_command(&self, event: &InboundEvent, command: Command) {
        debug!(channel_id = %event.channel_id, "Dispatching command");
        match command {
            Command::Ask { question } => {
                if question.is_empty() {
                    self.send(&event.channel_id, self.usage_hint("ask")).await;
                } else {
                    self.chat(event, &question).await;
                }
            }
            Command::Analyze { code } => {
                if code.is_empty() {
                    self.send(&event.channel_id, self.usage_hint("analyze"))
                        .await;
                    return;
                }
                let prompt = format!(
                    "Review this code in depth. Cover bugs, style, and concrete \
                     improvements.\n\n{code}"
                );
                match self.one_shot(Task::Analyze, prompt).await {
                    Ok(analysis) => {
                        self.send(
                            &event.channel_id,
                            truncate_rich(&format!("\u{1f50d} **Analysis**\n\n{analysis}")),
                        )
                        .await;
                    }
                    Err(error) => {
                        warn!(error = %error, "Code analysis failed");
                        self.send(&event.channel_id, provider_error_reply(&error))
                            .await;
                    }
                }
            }
            Command::Fix { code } => {
                if code.is_empty() {
                    self.send(
                        &event.channel_id,
                        "Paste code after the command, or attach the file you want fixed.",
                    )
                    .await;
                    return;
                }
                let prompt = format!(
                    "Fix every bug, syntax error, and obvious problem in this code. \
                     Return only the corrected code, with no commentary.\n\n{code}"
                );
                match self.one_shot(Task::Fix, prompt).await {
                    Ok(raw) => {
                        let cleaned = strip_code_fences(&raw);
                        self.send(
                            &event.channel_id,
                            truncate_rich(&format!(
                                "\u{1f527} **Fixed code**\n```\n{cleaned}\n```"
                            )),
                        )
                        .await;
                    }
                    Err(error) => {
                        self.send(&event.channel_id, provider_error_reply(&error))
                            .await;
                    }
                }
            }
            Command::Convert { language, code } => {
                if language.is_empty() || code.is_empty() {
                    self.send(&event.channel_id, self.usage_hint("convert"))
                        .await;
                    return;
                }
                let prompt = format!(
                    "Convert this code to {language}. Keep the behavior identical \
                     and return only the converted code.\n\n{code}"
                );
                match self.one_shot(Task::Convert, prompt).await {
                    Ok(raw) => {
                        let cleaned = strip_code_fences(&raw);
                        self.send(
                            &event.channel_id,
                            truncate_rich(&format!(
                                "\u{1f504} **{language} version**\n```\n{cleaned}\n```"
                            )),
                        )
                        .await;
                    }
                    Err(error) => {
                        self.send(&event.channel_id, provider_error_reply(&error))
                            .await;
                    }
                }
            }
            Command::Scaffold { kind, brief } => {
                if kind == ScaffoldKind::Services {
                    self.send(&event.channel_id, services_reply()).await;
                    return;
                }
                if brief.is_empty() {
                    self.send(&event.channel_id, self.usage_hint(kind.command_name()))
                        .await;
                    return;
                }
                // prompt() only returns None for Services, handled above
                let Some((task, prompt)) = kind.prompt(&brief) else {
                    return;
                };
                match self.one_shot(task, prompt).await {
                    Ok(plan) => {
                        self.send(
                            &event.channel_id,
                            truncate_rich(&format!(
                                "\u{1f3d7}\u{fe0f} **{}**\n\n{plan}",
                                kind.title()
                            )),
                        )
                        .await;
                    }
                    Err(error) => {
                        warn!(scaffold = kind.command_name(), error = %error, "Scaffold failed");
                        self.send(&event.channel_id, provider_error_reply(&error))
                            .await;
                    }
                }
            }
            Command::Clear => {
                let key = ConversationKey::user(&event.author_id);
                match self.store.clear(&key).await {
                    Ok(()) => {
                        self.send(
                            &event.channel_id,
                            "\u{1f9f9} Done. I've forgotten our conversation.",
                        )
                        .await;
                    }
                    Err(error) => {
                        warn!(key = %key, error = %error, "Clear failed");
                        self.send(
                            &event.channel_id,
                            "\u{26a0}\u{fe0f} I couldn't reach the memory store just now.",
                        )
                        .await;
                    }
                }
            }
            Command::Stats => {
                match self.store.user_stats(&event.author_id).await {
                    Ok(Some(stats)) => {
                        let text = format!(
                            "\u{1f4ca} **Your stats**\nRequests: {}\nFiles analyzed: {}\n\
                             First seen: {}\nLast used: {}",
                            stats.total_requests,
                            stats.files_analyzed,
                            stats.first_seen.format("%Y-%m-%d"),
                            stats.last_used.format("%Y-%m-%d %H:%M UTC"),
                        );
                        self.send(&event.channel_id, text).await;
                    }
                    Ok(None) => {
                        self.send(&event.channel_id, "No usage recorded yet. Say hi first!")
                            .await;
                    }
                    Err(error) => {
                        warn!(error = %error, "Stats read failed");
                        self.send(
                            &event.channel_id,
                            "\u{26a0}\u{fe0f} Stats are unavailable right now.",
                        )
                        .await;
                    }
                }
            }
            Command::Ping => {
                self.send(
                    &event.channel_id,
                    format!(
                        "\u{1f3d3} Pong! Up {}.",
                        format_uptime(self.started_at.elapsed())
                    ),
                )
                .await;
            }
            Command::Help => {
                self.send(&event.channel_id, help_text(&self.command_prefix))
                    .await;
            }
            Command::SetChannel => {
                let Some(guild_id) = event.guild_id.as_deref() else {
                    self.send(&event.channel_id, "Run this inside a server channel.")
                        .await;
                    return;
                };
                match self
                    .store
                    .set_auto_channel(guild_id, &event.channel_id)
                    .await
                {
                    Ok(()) => {
                        info!(guild_id, channel_id = %event.channel_id, "Auto-response channel set");
                        self.send(
                            &event.channel_id,
                            "\u{2705} I'll reply to every message in this channel now.",
                        )
                        .await;
                    }
                    Err(error) => {
                        warn!(guild_id, error = %error, "Auto-channel write failed");
                        self.send(
                            &event.channel_id,
                            "\u{26a0}\u{fe0f} I couldn't save that setting.",
                        )
                        .await;
                    }
                }
            }
            Command::RemoveChannel => {
                let Some(guild_id) = event.guild_id.as_deref() else {
                    self.send(&event.channel_id, "Run this inside a server channel.")
                        .await;
                    return;
                };
                match self.store.remove_auto_channel(guild_id).await {
                    Ok(true) => {
                        info!(guild_id, "Auto-response channel removed");
                        self.send(
                            &event.channel_id,
                            "\u{2705} Auto-response disabled for this server.",
                        )
                        .await;
                    }
                    Ok(false) => {
                        self.send(
                            &event.channel_id,
                            "\u{2139}\u{fe0f} No auto-response channel was set.",
                        )
                        .await;
                    }
                    Err(error) => {
                        warn!(guild_id, error = %error, "Auto-channel removal failed");
                        self.send(
                            &event.channel_id,
                            "\u{26a0}\u{fe0f} I couldn't update that setting.",
                        )
                        .await;
                    }
                }
            }
            Command::AiStatus => {
                let Some(guild_id) = event.guild_id.as_deref() else {
                    self.send(&event.channel_id, "I always reply in direct messages.")
                        .await;
                    return;
                };
                match self.store.auto_channel(guild_id).await {
                    Ok(Some(channel)) => {
                        self.send(
                            &event.channel_id,
                            format!("\u{1f7e2} Auto-response is bound to <#{channel}>."),
                        )
                        .await;
                    }
                    Ok(None) => {
                        self.send(
                            &event.channel_id,
                            format!(
                                "\u{26aa} No auto-response channel is set. Use \
                                 `{}setchannel` in the channel you want.",
                                self.command_prefix
                            ),
                        )
                        .await;
                    }
                    Err(error) => {
                        warn!(guild_id, error = %error, "Auto-channel read failed");
                        self.send(
                            &event.channel_id,
                            "\u{26a0}\u{fe0f} Settings are unavailable right now.",
                        )
                        .await;
                    }
                }
            }
            Command::BotInfo => {
                let stats = self.store.global_stats().await.unwrap_or_default();
                let text = format!(
                    "\u{1f916} **{ASSISTANT_NAME}** v{}\nUptime: {}\nRequests served: {}\n\
                     Users: {}\nFiles analyzed: {}",
                    env!("CARGO_PKG_VERSION"),
                    format_uptime(self.started_at.elapsed()),
                    stats.total_requests,
                    stats.unique_users,
                    stats.files_analyzed,
                );
                self.send(&event.channel_id, text).await;
            }
            Command::ServerStats => {
                let Some(guild_id) = event.guild_id.as_deref() else {
                    self.send(&event.channel_id, "Run this inside a server channel.")
                        .await;
                    return;
                };
                let auto = self
                    .store
                    .auto_channel(guild_id)
                    .await
                    .ok()
                    .flatten()
                    .map(|channel| format!("<#{channel}>"))
                    .unwrap_or_else(|| "off".to_string());
                let stats = self.store.global_stats().await.unwrap_or_default();
                let text = format!(
                    "\u{1f4c8} **Server overview**\nAuto-response: {auto}\n\
                     Total requests: {}\nFiles analyzed: {}\nUptime: {}",
                    stats.total_requests,
                    stats.files_analyzed,
                    format_uptime(self.started_at.elapsed()),
                );
                self.send(&event.channel_id, text).await;
            }
        }
    }

    fn model_for(&self, task: Task) -> &str {
        if task.uses_chat_model() {
            &self.chat_model
        } else {
            &self.analyze_model
        }
    }

    async fn complete_task(
        &self,
        task: Task,
        messages: Vec<ChatMessage>,
    ) -> Result<String, ProviderError> {
        let params = task.params();
        let request = CompletionRequest::new(self.model_for(task), messages)
            .with_max_tokens(params.max_tokens)
            .with_temperature(params.temperature);
        let response = self.provider.complete(request).await?;
        Ok(response.content)
    }

    /// Persona plus a single user prompt, no history.
    async fn one_shot(&self, task: Task, prompt: String) -> Result<String, ProviderError> {
        let messages = vec![
            ChatMessage::system(PERSONA_PREAMBLE),
            ChatMessage::user(prompt),
        ];
        self.complete_task(task, messages).await
    }

    fn usage_hint(&self, name: &str) -> String {
        match commands::spec_for(name) {
            Some(spec) => format!("Usage: `{}{}`", self.command_prefix, spec.usage),
            None => format!("Try `{}help`.", self.command_prefix),
        }
    }

    /// Best-effort reply. Delivery failures are logged, never propagated.
    async fn send(&self, channel_id: &str, text: impl Into<String>) -> Option<String> {
        match self
            .platform
            .reply(channel_id, OutboundMessage::text(text))
            .await
        {
            Ok(message_id) => Some(message_id),
            Err(error) => {
                warn!(channel_id, error = %error, "Reply delivery failed");
                None
            }
        }
    }

    /// Edit the progress notice into the final text, or send fresh if the
    /// notice never landed or the edit fails.
    async fn replace_or_send(&self, event: &InboundEvent, notice: Option<String>, text: String) {
        if let Some(id) = notice {
            match self
                .platform
                .edit_message(&event.channel_id, &id, &text)
                .await
            {
                Ok(()) => return,
                Err(error) => debug!(error = %error, "Edit failed, sending a new message"),
            }
        }
        self.send(&event.channel_id, text).await;
    }

    async fn append(&self, key: &ConversationKey, turn: Turn) {
        if let Err(error) = self.store.append(key, turn).await {
            warn!(key = %key, error = %error, "Memory append failed, continuing");
        }
    }

    async fn record_request(&self, user_id: &str) {
        if let Err(error) = self.store.record_request(user_id).await {
            warn!(user_id, error = %error, "Stats write failed, continuing");
        }
    }

    async fn record_analysis(&self, attachment: &Attachment, user_id: &str) {
        let record = AnalysisRecord::new(&attachment.filename, user_id, attachment.classify());
        if let Err(error) = self.store.record_analysis(record).await {
            warn!(user_id, error = %error, "Analysis log write failed, continuing");
        }
    }
}
