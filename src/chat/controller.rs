use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::chat::backend::{ChatBackend, FEEDBACK_PATH, SATISFACTION_PATH};
use crate::chat::intent;
use crate::chat::models::{
    ChatAnswer, ChatRequest, ContextEntry, FeedbackPayload, Message, Rating, SatisfactionPayload,
    Session, SubmitAck,
};
use crate::chat::view::{ChatView, PromptAction, Timer, FEEDBACK_QUESTION, SATISFACTION_QUESTION};
use crate::config::{FailureNotice, WidgetConfig};
use crate::dispatch::{Dispatch, Ignored};
use crate::error::WidgetError;
use crate::page::ClickTarget;
use crate::theme::ThemeCommands;

pub const FEEDBACK_ACK: &str =
    "I'd love to hear your feedback! Let me help you share that with our team.";
pub const EMPTY_ANSWER_FALLBACK: &str =
    "I'm here to help! Could you tell me more about what you're looking for?";
pub const SERVICE_ERROR_FALLBACK: &str = "I'm having a bit of trouble right now, but I'm here to help! Please try again or visit our contact page.";
pub const BLANK_FEEDBACK_THANKS: &str = "Thank you anyway! Feel free to chat anytime. 😊";
pub const FEEDBACK_THANKS: &str =
    "Thank you for your valuable feedback! We'll use it to improve our service. 🙏";
pub const FEEDBACK_THANKS_ANYWAY: &str = "Thanks for your feedback! We appreciate your input. 😊";
pub const FEEDBACK_APOLOGY: &str =
    "Sorry, we couldn't send your feedback right now. Please try again later.";
pub const RATING_THANKS_ANYWAY: &str = "Thanks for rating us! 😊";
pub const RATING_APOLOGY: &str =
    "Sorry, we couldn't save your rating right now. Please try again later.";
pub const SKIP_FAREWELL: &str = "No problem! Thanks for chatting with me! 😊";

pub fn rating_thanks(rating: Rating) -> String {
    format!(
        "Thank you for your feedback {}! This helps us improve our service. 🙏",
        rating.emoji()
    )
}

/// True after the 1st user message and every `interval` messages after it.
pub fn satisfaction_due(user_message_count: u32, interval: u32) -> bool {
    interval > 0 && user_message_count > 0 && (user_message_count - 1) % interval == 0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatPhase {
    Idle,
    AwaitingInput,
    AwaitingBotReply,
    AwaitingSatisfactionRating,
    AwaitingTextFeedback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotReply {
    pub text: String,
    /// Show the text-feedback prompt once the reply has rendered.
    pub offer_feedback: bool,
}

impl BotReply {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            offer_feedback: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prompt {
    Feedback,
    Satisfaction,
}

#[derive(Default)]
struct ChatState {
    open: bool,
    session: Session,
    satisfaction_visible: bool,
    feedback_visible: bool,
    reply_in_flight: bool,
    rating_in_flight: bool,
    feedback_in_flight: bool,
}

/// Owns one page load's conversation and drives the view through it.
///
/// Methods take `&self` so the host can share the controller behind an `Rc`
/// and spawn each event handler as its own local task. No `RefCell` borrow is
/// held across an await point.
pub struct ChatController<B, V, T> {
    backend: B,
    view: V,
    timer: T,
    theme: Rc<dyn ThemeCommands>,
    config: WidgetConfig,
    state: RefCell<ChatState>,
}

impl<B: ChatBackend, V: ChatView, T: Timer> ChatController<B, V, T> {
    pub fn new(
        backend: B,
        view: V,
        timer: T,
        theme: Rc<dyn ThemeCommands>,
        config: WidgetConfig,
    ) -> Self {
        Self::with_session(backend, view, timer, theme, config, Session::new())
    }

    pub fn with_session(
        backend: B,
        view: V,
        timer: T,
        theme: Rc<dyn ThemeCommands>,
        config: WidgetConfig,
        session: Session,
    ) -> Self {
        tracing::debug!("Chat session {} started", session.session_id);
        Self {
            backend,
            view,
            timer,
            theme,
            config,
            state: RefCell::new(ChatState {
                session,
                ..ChatState::default()
            }),
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn session_id(&self) -> String {
        self.state.borrow().session.session_id.clone()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.state.borrow().session.messages().to_vec()
    }

    pub fn user_message_count(&self) -> u32 {
        self.state.borrow().session.user_message_count()
    }

    pub fn is_open(&self) -> bool {
        self.state.borrow().open
    }

    pub fn phase(&self) -> ChatPhase {
        let state = self.state.borrow();
        if state.reply_in_flight {
            ChatPhase::AwaitingBotReply
        } else if state.satisfaction_visible {
            ChatPhase::AwaitingSatisfactionRating
        } else if state.feedback_visible {
            ChatPhase::AwaitingTextFeedback
        } else if state.open || !state.session.messages().is_empty() {
            ChatPhase::AwaitingInput
        } else {
            ChatPhase::Idle
        }
    }

    pub fn toggle(&self) {
        let open = !self.is_open();
        self.set_open(open);
    }

    pub fn open(&self) {
        self.set_open(true);
    }

    pub fn close(&self) {
        self.set_open(false);
    }

    fn set_open(&self, open: bool) {
        {
            let mut state = self.state.borrow_mut();
            if state.open == open {
                return;
            }
            state.open = open;
        }
        self.view.set_open(open);
    }

    pub fn handle_click(&self, target: ClickTarget) {
        if target == ClickTarget::Outside && self.is_open() {
            self.close();
        }
    }

    /// The last few messages, as sent along with ratings and feedback.
    pub fn conversation_context(&self) -> Vec<ContextEntry> {
        self.state.borrow().session.context(self.config.context_window)
    }

    fn append(&self, message: Message) {
        self.state.borrow_mut().session.push(message.clone());
        self.view.render_message(&message);
    }

    pub async fn submit_user_message(&self, text: &str) -> Dispatch {
        let text = text.trim();
        if text.is_empty() {
            return Dispatch::Ignored(Ignored::Blank);
        }
        {
            let mut state = self.state.borrow_mut();
            if state.reply_in_flight {
                return Dispatch::Ignored(Ignored::Busy);
            }
            state.reply_in_flight = true;
        }

        self.append(Message::user(text));
        let count = self.user_message_count();
        self.view.clear_input();
        self.view.show_typing();
        let typing = self.backend.typing_delay();
        if !typing.is_zero() {
            self.timer.sleep(typing).await;
        }

        let reply = self.resolve_bot_reply(text).await;

        self.view.hide_typing();
        self.state.borrow_mut().reply_in_flight = false;
        self.append(Message::bot(reply.text));

        let mut follow_ups = Vec::new();
        if reply.offer_feedback {
            follow_ups.push((self.config.feedback_after_intent_delay, Prompt::Feedback));
        }
        if self.backend.collects_feedback()
            && satisfaction_due(count, self.config.satisfaction_interval)
        {
            follow_ups.push((self.config.satisfaction_delay, Prompt::Satisfaction));
        }
        self.run_follow_ups(follow_ups).await;

        Dispatch::Handled
    }

    async fn run_follow_ups(&self, mut follow_ups: Vec<(Duration, Prompt)>) {
        follow_ups.sort_by_key(|(delay, _)| *delay);
        let mut elapsed = Duration::ZERO;
        for (delay, prompt) in follow_ups {
            self.timer.sleep(delay.saturating_sub(elapsed)).await;
            elapsed = delay;
            match prompt {
                Prompt::Feedback => self.show_feedback_prompt(),
                Prompt::Satisfaction => self.show_satisfaction_prompt(),
            }
        }
    }

    /// Theme commands first, then feedback intent, then the backend. Feedback
    /// intent is only recognised when the backend collects feedback.
    pub async fn resolve_bot_reply(&self, text: &str) -> BotReply {
        if let Some(theme) = intent::theme_command(text) {
            self.theme.set_preference(theme);
            return BotReply::plain(intent::theme_confirmation(theme));
        }

        if self.backend.collects_feedback() && intent::wants_to_give_feedback(text) {
            return BotReply {
                text: FEEDBACK_ACK.to_string(),
                offer_feedback: true,
            };
        }

        let request = ChatRequest {
            question: text.to_string(),
            user_id: String::new(),
            session_id: self.session_id(),
        };
        match self.backend.ask(&request).await {
            Ok(ChatAnswer {
                answer: Some(answer),
            }) if !answer.is_empty() => BotReply::plain(answer),
            Ok(_) => BotReply::plain(EMPTY_ANSWER_FALLBACK),
            Err(e) => {
                tracing::error!("AI service error: {}", e);
                BotReply::plain(SERVICE_ERROR_FALLBACK)
            }
        }
    }

    pub async fn schedule_satisfaction_prompt(&self) {
        self.timer.sleep(self.config.satisfaction_delay).await;
        self.show_satisfaction_prompt();
    }

    /// No-op while a satisfaction prompt is already showing.
    pub fn show_satisfaction_prompt(&self) {
        if !self.backend.collects_feedback() {
            return;
        }
        {
            let mut state = self.state.borrow_mut();
            if state.satisfaction_visible {
                return;
            }
            state.satisfaction_visible = true;
        }
        self.view.show_satisfaction_prompt(SATISFACTION_QUESTION, &Rating::ALL);
    }

    /// No-op while a feedback prompt is already showing.
    pub fn show_feedback_prompt(&self) {
        if !self.backend.collects_feedback() {
            return;
        }
        {
            let mut state = self.state.borrow_mut();
            if state.feedback_visible {
                return;
            }
            state.feedback_visible = true;
        }
        self.view.show_feedback_prompt(FEEDBACK_QUESTION);
    }

    fn remove_satisfaction_prompt(&self) {
        self.state.borrow_mut().satisfaction_visible = false;
        self.view.remove_satisfaction_prompt();
    }

    fn remove_feedback_prompt(&self) {
        self.state.borrow_mut().feedback_visible = false;
        self.view.remove_feedback_prompt();
    }

    pub async fn submit_satisfaction_rating(&self, rating: Rating) -> Dispatch {
        {
            let mut state = self.state.borrow_mut();
            if state.rating_in_flight {
                return Dispatch::Ignored(Ignored::Busy);
            }
            state.rating_in_flight = true;
        }
        self.remove_satisfaction_prompt();

        let payload = SatisfactionPayload {
            rating,
            session_id: self.session_id(),
            conversation_context: self.conversation_context(),
        };
        let result = self.backend.submit_satisfaction(&payload).await;
        self.state.borrow_mut().rating_in_flight = false;

        match accepted(result, SATISFACTION_PATH) {
            Ok(()) => {
                self.append(Message::bot(rating_thanks(rating)));
                self.timer.sleep(self.config.feedback_after_rating_delay).await;
                self.show_feedback_prompt();
            }
            Err(e) => {
                tracing::error!("Error submitting satisfaction: {}", e);
                let notice = match self.config.satisfaction_failure {
                    FailureNotice::Silent => None,
                    FailureNotice::ThankAnyway => Some(RATING_THANKS_ANYWAY),
                    FailureNotice::Apologize => Some(RATING_APOLOGY),
                };
                if let Some(text) = notice {
                    self.append(Message::bot(text));
                }
            }
        }
        Dispatch::Handled
    }

    /// Blank feedback is thanked locally without a request.
    pub async fn submit_text_feedback(&self, text: &str) -> Dispatch {
        if text.trim().is_empty() {
            self.remove_feedback_prompt();
            self.append(Message::bot(BLANK_FEEDBACK_THANKS));
            return Dispatch::Handled;
        }
        {
            let mut state = self.state.borrow_mut();
            if state.feedback_in_flight {
                return Dispatch::Ignored(Ignored::Busy);
            }
            state.feedback_in_flight = true;
        }
        self.remove_feedback_prompt();

        let payload = FeedbackPayload {
            feedback_type: "general".to_string(),
            feedback_text: text.to_string(),
            session_id: self.session_id(),
            conversation_context: self.conversation_context(),
        };
        let result = self.backend.submit_feedback(&payload).await;
        self.state.borrow_mut().feedback_in_flight = false;

        match accepted(result, FEEDBACK_PATH) {
            Ok(()) => self.append(Message::bot(FEEDBACK_THANKS)),
            Err(e) => {
                tracing::error!("Error submitting feedback: {}", e);
                let notice = match self.config.feedback_failure {
                    FailureNotice::Silent => None,
                    FailureNotice::ThankAnyway => Some(FEEDBACK_THANKS_ANYWAY),
                    FailureNotice::Apologize => Some(FEEDBACK_APOLOGY),
                };
                if let Some(text) = notice {
                    self.append(Message::bot(text));
                }
            }
        }
        Dispatch::Handled
    }

    pub fn skip_text_feedback(&self) {
        self.remove_feedback_prompt();
        self.append(Message::bot(SKIP_FAREWELL));
    }

    /// Runs a click on one of the prompt controls. `feedback_text` is only
    /// read for [`PromptAction::SubmitFeedback`].
    pub async fn handle_prompt_action(
        &self,
        action: PromptAction,
        feedback_text: &str,
    ) -> Dispatch {
        match action {
            PromptAction::Rate(rating) => self.submit_satisfaction_rating(rating).await,
            PromptAction::SubmitFeedback => self.submit_text_feedback(feedback_text).await,
            PromptAction::SkipFeedback => {
                self.skip_text_feedback();
                Dispatch::Handled
            }
        }
    }
}

fn accepted(
    result: Result<SubmitAck, WidgetError>,
    endpoint: &'static str,
) -> Result<(), WidgetError> {
    match result {
        Ok(ack) if ack.success => Ok(()),
        Ok(_) => Err(WidgetError::Rejected { endpoint }),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::backend::CHAT_PATH;
    use crate::chat::offline::{OfflineBackend, TYPING_DELAY_MAX, TYPING_DELAY_MIN};
    use crate::theme::Theme;
    use std::cell::{Cell, RefCell};
    use std::future::Future;

    #[derive(Clone)]
    enum Script {
        Answer(&'static str),
        Fail,
    }

    #[derive(Default)]
    struct FakeBackend {
        answers: RefCell<Vec<Script>>,
        ack: Cell<Option<bool>>,
        yield_once: Cell<bool>,
        asked: RefCell<Vec<ChatRequest>>,
        ratings: RefCell<Vec<SatisfactionPayload>>,
        feedback: RefCell<Vec<FeedbackPayload>>,
    }

    impl FakeBackend {
        fn answering(script: Script) -> Self {
            let backend = Self::default();
            backend.answers.borrow_mut().push(script);
            backend.ack.set(Some(true));
            backend
        }

        fn ack(&self) -> Result<SubmitAck, WidgetError> {
            match self.ack.get() {
                Some(success) => Ok(SubmitAck { success }),
                None => Err(WidgetError::Unsupported("offline")),
            }
        }
    }

    impl ChatBackend for FakeBackend {
        async fn ask(&self, request: &ChatRequest) -> Result<ChatAnswer, WidgetError> {
            self.asked.borrow_mut().push(request.clone());
            if self.yield_once.replace(false) {
                tokio::task::yield_now().await;
            }
            let script = self.answers.borrow().first().cloned().unwrap_or(Script::Fail);
            match script {
                Script::Answer("") => Ok(ChatAnswer { answer: None }),
                Script::Answer(text) => Ok(ChatAnswer {
                    answer: Some(text.to_string()),
                }),
                Script::Fail => Err(WidgetError::Rejected { endpoint: CHAT_PATH }),
            }
        }

        async fn submit_satisfaction(
            &self,
            payload: &SatisfactionPayload,
        ) -> Result<SubmitAck, WidgetError> {
            self.ratings.borrow_mut().push(payload.clone());
            self.ack()
        }

        async fn submit_feedback(
            &self,
            payload: &FeedbackPayload,
        ) -> Result<SubmitAck, WidgetError> {
            self.feedback.borrow_mut().push(payload.clone());
            self.ack()
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Open(bool),
        Message(String, bool),
        ClearInput,
        TypingOn,
        TypingOff,
        SatisfactionShown,
        SatisfactionRemoved,
        FeedbackShown,
        FeedbackRemoved,
    }

    #[derive(Default)]
    struct RecordingView {
        events: RefCell<Vec<Event>>,
    }

    impl RecordingView {
        fn count(&self, event: &Event) -> usize {
            self.events.borrow().iter().filter(|e| *e == event).count()
        }
    }

    impl ChatView for RecordingView {
        fn set_open(&self, open: bool) {
            self.events.borrow_mut().push(Event::Open(open));
        }
        fn render_message(&self, message: &Message) {
            self.events
                .borrow_mut()
                .push(Event::Message(message.text.clone(), message.is_from_bot));
        }
        fn clear_input(&self) {
            self.events.borrow_mut().push(Event::ClearInput);
        }
        fn show_typing(&self) {
            self.events.borrow_mut().push(Event::TypingOn);
        }
        fn hide_typing(&self) {
            self.events.borrow_mut().push(Event::TypingOff);
        }
        fn show_satisfaction_prompt(&self, _question: &str, options: &[Rating]) {
            assert_eq!(options.len(), 4);
            self.events.borrow_mut().push(Event::SatisfactionShown);
        }
        fn remove_satisfaction_prompt(&self) {
            self.events.borrow_mut().push(Event::SatisfactionRemoved);
        }
        fn show_feedback_prompt(&self, _question: &str) {
            self.events.borrow_mut().push(Event::FeedbackShown);
        }
        fn remove_feedback_prompt(&self) {
            self.events.borrow_mut().push(Event::FeedbackRemoved);
        }
    }

    #[derive(Default)]
    struct InstantTimer {
        slept: RefCell<Vec<Duration>>,
    }

    impl Timer for InstantTimer {
        fn sleep(&self, duration: Duration) -> impl Future<Output = ()> {
            self.slept.borrow_mut().push(duration);
            std::future::ready(())
        }
    }

    #[derive(Default)]
    struct RecordingTheme {
        set: RefCell<Vec<Theme>>,
    }

    impl ThemeCommands for RecordingTheme {
        fn set_preference(&self, theme: Theme) {
            self.set.borrow_mut().push(theme);
        }
    }

    type Controller = ChatController<FakeBackend, RecordingView, InstantTimer>;

    fn controller_with<B: ChatBackend>(
        backend: B,
        config: WidgetConfig,
    ) -> (ChatController<B, RecordingView, InstantTimer>, Rc<RecordingTheme>) {
        let theme = Rc::new(RecordingTheme::default());
        let controller = ChatController::with_session(
            backend,
            RecordingView::default(),
            InstantTimer::default(),
            theme.clone(),
            config,
            Session::with_id("session-1-abcdefghi"),
        );
        (controller, theme)
    }

    fn controller(backend: FakeBackend) -> (Controller, Rc<RecordingTheme>) {
        controller_with(backend, WidgetConfig::default())
    }

    #[test]
    fn satisfaction_schedule() {
        let due: Vec<u32> = (0..=20).filter(|n| satisfaction_due(*n, 6)).collect();
        assert_eq!(due, vec![1, 7, 13, 19]);
        assert!(!satisfaction_due(1, 0));
    }

    #[tokio::test]
    async fn answer_from_backend_is_rendered() {
        let (chat, _) = controller(FakeBackend::answering(Script::Answer("We offer...")));

        let outcome = chat.submit_user_message("What services do you offer?").await;

        assert_eq!(outcome, Dispatch::Handled);
        let asked = chat.backend.asked.borrow();
        assert_eq!(asked.len(), 1);
        assert_eq!(asked[0].question, "What services do you offer?");
        assert_eq!(asked[0].session_id, "session-1-abcdefghi");
        assert_eq!(asked[0].user_id, "");
        let messages = chat.messages();
        assert_eq!(messages.last().unwrap().text, "We offer...");
        assert!(messages.last().unwrap().is_from_bot);
        assert_eq!(
            *chat.view().events.borrow(),
            vec![
                Event::Message("What services do you offer?".into(), false),
                Event::ClearInput,
                Event::TypingOn,
                Event::TypingOff,
                Event::Message("We offer...".into(), true),
                Event::SatisfactionShown,
            ]
        );
    }

    #[tokio::test]
    async fn blank_input_is_ignored() {
        let (chat, _) = controller(FakeBackend::answering(Script::Answer("x")));
        assert_eq!(chat.submit_user_message("   ").await, Dispatch::Ignored(Ignored::Blank));
        assert!(chat.messages().is_empty());
        assert!(chat.view().events.borrow().is_empty());
    }

    #[tokio::test]
    async fn dark_command_beats_feedback_and_skips_backend() {
        let (chat, theme) = controller(FakeBackend::answering(Script::Answer("x")));

        chat.submit_user_message("Make it DARK, also some feedback").await;

        assert_eq!(*theme.set.borrow(), vec![Theme::Dark]);
        assert!(chat.backend.asked.borrow().is_empty());
        assert_eq!(chat.messages()[1].text, intent::DARK_CONFIRMATION);
        assert_eq!(chat.view().count(&Event::FeedbackShown), 0);
    }

    #[tokio::test]
    async fn feedback_intent_acknowledges_then_prompts() {
        let (chat, _) = controller(FakeBackend::answering(Script::Answer("x")));

        let reply = chat.resolve_bot_reply("I have some feedback").await;
        assert_eq!(reply.text, FEEDBACK_ACK);
        assert!(reply.offer_feedback);
        assert!(chat.backend.asked.borrow().is_empty());

        chat.submit_user_message("I have some feedback").await;
        assert!(chat.backend.asked.borrow().is_empty());
        assert_eq!(chat.view().count(&Event::FeedbackShown), 1);
        // first message also earns a satisfaction prompt; feedback comes first
        assert_eq!(
            *chat.timer.slept.borrow(),
            vec![Duration::from_millis(1000), Duration::from_millis(500)]
        );
        assert_eq!(chat.phase(), ChatPhase::AwaitingSatisfactionRating);
    }

    #[tokio::test]
    async fn backend_failures_are_masked() {
        let (chat, _) = controller(FakeBackend::answering(Script::Fail));
        chat.submit_user_message("hello").await;
        assert_eq!(chat.messages()[1].text, SERVICE_ERROR_FALLBACK);
        assert_eq!(chat.view().count(&Event::TypingOff), 1);

        let (chat, _) = controller(FakeBackend::answering(Script::Answer("")));
        chat.submit_user_message("hello").await;
        assert_eq!(chat.messages()[1].text, EMPTY_ANSWER_FALLBACK);
    }

    #[tokio::test]
    async fn overlapping_submissions_are_rejected() {
        let backend = FakeBackend::answering(Script::Answer("hi"));
        backend.yield_once.set(true);
        let (chat, _) = controller(backend);

        let (first, second) = tokio::join!(
            chat.submit_user_message("one"),
            chat.submit_user_message("two")
        );

        assert_eq!(first, Dispatch::Handled);
        assert_eq!(second, Dispatch::Ignored(Ignored::Busy));
        assert_eq!(chat.user_message_count(), 1);
        assert_eq!(chat.backend.asked.borrow().len(), 1);
    }

    #[tokio::test]
    async fn satisfaction_prompt_does_not_stack() {
        let (chat, _) = controller(FakeBackend::answering(Script::Answer("ok")));
        for i in 0..13 {
            chat.submit_user_message(&format!("question {}", i)).await;
        }
        // due at 1, 7 and 13 but the first prompt was never answered
        assert_eq!(chat.view().count(&Event::SatisfactionShown), 1);
        assert_eq!(chat.timer.slept.borrow().len(), 3);
    }

    #[tokio::test]
    async fn seventh_message_rating_flow() {
        let (chat, _) = controller(FakeBackend::answering(Script::Answer("ok")));
        chat.submit_user_message("first").await;
        chat.skip_satisfaction_for_test();
        for i in 2..=7 {
            chat.submit_user_message(&format!("message {}", i)).await;
        }
        assert_eq!(chat.view().count(&Event::SatisfactionShown), 2);
        assert_eq!(chat.phase(), ChatPhase::AwaitingSatisfactionRating);

        let outcome = chat.submit_satisfaction_rating(Rating::VerySatisfied).await;

        assert_eq!(outcome, Dispatch::Handled);
        let ratings = chat.backend.ratings.borrow();
        assert_eq!(ratings.len(), 1);
        assert_eq!(ratings[0].rating, Rating::VerySatisfied);
        assert_eq!(ratings[0].conversation_context.len(), 5);
        let events = chat.view().events.borrow();
        let tail = &events[events.len() - 3..];
        assert_eq!(
            tail,
            &[
                Event::SatisfactionRemoved,
                Event::Message(rating_thanks(Rating::VerySatisfied), true),
                Event::FeedbackShown,
            ]
        );
        assert_eq!(
            chat.timer.slept.borrow().last(),
            Some(&Duration::from_millis(1500))
        );
        drop(events);
        assert_eq!(chat.phase(), ChatPhase::AwaitingTextFeedback);
    }

    #[tokio::test]
    async fn rating_failure_is_silent_by_default() {
        let backend = FakeBackend::answering(Script::Answer("ok"));
        backend.ack.set(Some(false));
        let (chat, _) = controller(backend);

        chat.submit_satisfaction_rating(Rating::Unsatisfied).await;

        assert!(chat.messages().is_empty());
        assert_eq!(chat.view().count(&Event::FeedbackShown), 0);
    }

    #[tokio::test]
    async fn rating_failure_notice_is_configurable() {
        let backend = FakeBackend::answering(Script::Answer("ok"));
        backend.ack.set(None);
        let config = WidgetConfig {
            satisfaction_failure: FailureNotice::Apologize,
            ..WidgetConfig::default()
        };
        let (chat, _) = controller_with(backend, config);

        chat.submit_satisfaction_rating(Rating::Satisfied).await;

        assert_eq!(chat.messages()[0].text, RATING_APOLOGY);
    }

    #[tokio::test]
    async fn blank_feedback_never_calls_backend() {
        let (chat, _) = controller(FakeBackend::answering(Script::Answer("ok")));
        chat.show_feedback_prompt();

        assert_eq!(chat.submit_text_feedback("  ").await, Dispatch::Handled);

        assert!(chat.backend.feedback.borrow().is_empty());
        assert_eq!(chat.messages().len(), 1);
        assert_eq!(chat.messages()[0].text, BLANK_FEEDBACK_THANKS);
        assert_eq!(chat.view().count(&Event::FeedbackRemoved), 1);
    }

    #[tokio::test]
    async fn feedback_is_posted_and_thanked() {
        let (chat, _) = controller(FakeBackend::answering(Script::Answer("ok")));
        chat.submit_user_message("hello").await;

        chat.submit_text_feedback("Great site").await;

        let sent = chat.backend.feedback.borrow();
        assert_eq!(sent[0].feedback_type, "general");
        assert_eq!(sent[0].feedback_text, "Great site");
        assert_eq!(sent[0].conversation_context.len(), 2);
        assert_eq!(chat.messages().last().unwrap().text, FEEDBACK_THANKS);
    }

    #[tokio::test]
    async fn feedback_failure_still_thanks_by_default() {
        let backend = FakeBackend::answering(Script::Answer("ok"));
        backend.ack.set(None);
        let (chat, _) = controller(backend);

        chat.submit_text_feedback("Menu is confusing").await;

        assert_eq!(chat.messages()[0].text, FEEDBACK_THANKS_ANYWAY);
    }

    #[tokio::test]
    async fn skipping_feedback_says_goodbye() {
        let (chat, _) = controller(FakeBackend::answering(Script::Answer("ok")));
        chat.show_feedback_prompt();
        chat.skip_text_feedback();
        assert_eq!(chat.messages()[0].text, SKIP_FAREWELL);
        assert_eq!(chat.phase(), ChatPhase::AwaitingInput);
    }

    #[test]
    fn open_close_and_outside_clicks() {
        let (chat, _) = controller(FakeBackend::default());
        assert_eq!(chat.phase(), ChatPhase::Idle);

        chat.toggle();
        assert!(chat.is_open());
        chat.handle_click(ClickTarget::Panel);
        chat.handle_click(ClickTarget::ToggleButton);
        assert!(chat.is_open());
        chat.handle_click(ClickTarget::Outside);
        assert!(!chat.is_open());
        chat.handle_click(ClickTarget::Outside);

        assert_eq!(
            *chat.view().events.borrow(),
            vec![Event::Open(true), Event::Open(false)]
        );
    }

    #[test]
    fn feedback_prompt_does_not_stack() {
        let (chat, _) = controller(FakeBackend::default());

        chat.show_feedback_prompt();
        chat.show_feedback_prompt();

        assert_eq!(chat.view().count(&Event::FeedbackShown), 1);
        assert_eq!(chat.phase(), ChatPhase::AwaitingTextFeedback);
    }

    #[tokio::test]
    async fn rating_failure_can_thank_anyway() {
        let backend = FakeBackend::answering(Script::Answer("ok"));
        backend.ack.set(Some(false));
        let config = WidgetConfig {
            satisfaction_failure: FailureNotice::ThankAnyway,
            ..WidgetConfig::default()
        };
        let (chat, _) = controller_with(backend, config);

        chat.submit_satisfaction_rating(Rating::Satisfied).await;

        assert_eq!(chat.messages().len(), 1);
        assert_eq!(chat.messages()[0].text, RATING_THANKS_ANYWAY);
        assert_eq!(chat.view().count(&Event::FeedbackShown), 0);
    }

    #[tokio::test]
    async fn offline_responder_never_asks_for_feedback() {
        let (chat, _) = controller_with(OfflineBackend::new(), WidgetConfig::default());

        chat.submit_user_message("I want to suggest something").await;
        chat.show_satisfaction_prompt();
        chat.show_feedback_prompt();

        let reply = &chat.messages()[1].text;
        assert_ne!(reply, FEEDBACK_ACK);
        assert_eq!(chat.view().count(&Event::FeedbackShown), 0);
        assert_eq!(chat.view().count(&Event::SatisfactionShown), 0);
        assert_eq!(chat.phase(), ChatPhase::AwaitingInput);
    }

    #[tokio::test]
    async fn offline_responder_types_before_answering() {
        let (chat, _) = controller_with(OfflineBackend::new(), WidgetConfig::default());

        chat.submit_user_message("switch to dark mode").await;

        let slept = chat.timer.slept.borrow();
        assert_eq!(slept.len(), 1);
        assert!(slept[0] >= TYPING_DELAY_MIN && slept[0] < TYPING_DELAY_MAX);
        assert_eq!(chat.messages()[1].text, intent::DARK_CONFIRMATION);
    }

    #[tokio::test]
    async fn prompt_actions_reach_the_matching_operation() {
        let (chat, _) = controller(FakeBackend::answering(Script::Answer("ok")));
        chat.show_satisfaction_prompt();

        let rated = chat.handle_prompt_action(PromptAction::Rate(Rating::Satisfied), "").await;
        assert_eq!(rated, Dispatch::Handled);
        assert_eq!(chat.backend.ratings.borrow()[0].rating, Rating::Satisfied);
        assert_eq!(chat.phase(), ChatPhase::AwaitingTextFeedback);

        chat.handle_prompt_action(PromptAction::SubmitFeedback, "More examples please")
            .await;
        assert_eq!(chat.backend.feedback.borrow()[0].feedback_text, "More examples please");

        chat.show_feedback_prompt();
        chat.handle_prompt_action(PromptAction::SkipFeedback, "ignored").await;
        assert_eq!(chat.messages().last().unwrap().text, SKIP_FAREWELL);
        assert_eq!(chat.backend.feedback.borrow().len(), 1);
    }

    impl Controller {
        fn skip_satisfaction_for_test(&self) {
            self.remove_satisfaction_prompt();
        }
    }
}
