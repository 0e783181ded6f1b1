use std::{ops::ControlFlow, path::Path};

use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines},
    sync::mpsc,
};

use super::{Conversation, SUGGESTIONS, SYSTEM_INSTRUCTION};
use crate::{
    AppError, AppResult, Cli,
    cli::{ChatCommand, HELP_TEXT},
    display::{self, ConversationView, ViewEvent},
    model::ModelProvider,
    providers::{self, GeminiConfig, GeminiProvider},
    utils::{ImageData, load_image},
};

/// One `()` per Ctrl-C for the lifetime of the session
type Interrupts = mpsc::UnboundedReceiver<()>;

fn start_conversation(cli: &Cli) -> AppResult<Conversation<GeminiProvider>> {
    let config = cli.apply_overrides(GeminiConfig::from_env()).build()?;
    log::info!("Using {:?}", config);

    let client = providers::create_gemini_client(config, SYSTEM_INSTRUCTION)?;
    Ok(Conversation::new(client))
}

fn pick_image(path: Option<&Path>) -> AppResult<Option<ImageData>> {
    path.map(load_image).transpose()
}

/// Installs the process-wide Ctrl-C handler once and forwards every press.
///
/// If the handler cannot be installed the channel closes and the default
/// signal behaviour stays in place.
fn listen_for_interrupts() -> Interrupts {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if tx.send(()).is_err() {
                break;
            }
        }
    });
    rx
}

/// One question (and/or image) from the command line, one answer on stdout.
pub async fn process_prompt(cli: &Cli) -> AppResult<()> {
    let mut view = display::create_cli_view(false);
    let image = pick_image(cli.image.as_deref())?;
    let prompt = cli.text()?;
    if prompt.is_none() && image.is_none() {
        return Err(AppError::InvalidInput);
    }

    let mut conversation = start_conversation(cli)?;
    conversation.set_draft_text(prompt.unwrap_or_default());
    conversation.select_image(image);

    let mut interrupts = listen_for_interrupts();
    send_interruptible(&mut conversation, None, &mut view, &mut interrupts).await?;

    view.finish().await?;
    log::info!("Prompt processing completed successfully");

    Ok(())
}

/// Interactive session on stdin until `/quit`, Ctrl-C at the prompt or end
/// of input.
pub async fn run_chat(cli: &Cli) -> AppResult<()> {
    let mut view = display::create_cli_view(true);
    let mut conversation = start_conversation(cli)?;
    if let Some(image) = pick_image(cli.image.as_deref())? {
        conversation.select_image(Some(image));
    }

    let lines = BufReader::new(tokio::io::stdin()).lines();
    let mut interrupts = listen_for_interrupts();
    chat_session(&mut conversation, &mut view, lines, &mut interrupts).await?;

    view.finish().await?;
    log::info!(
        "Chat session ended after {} turns",
        conversation.messages().len()
    );
    Ok(())
}

async fn chat_session<P, R>(
    conversation: &mut Conversation<P>,
    view: &mut dyn ConversationView,
    mut lines: Lines<R>,
    interrupts: &mut Interrupts,
) -> AppResult<()>
where
    P: ModelProvider,
    R: AsyncBufRead + Unpin,
{
    for message in conversation.messages() {
        view.handle_event(ViewEvent::Turn(message.clone())).await?;
    }
    view.handle_event(ViewEvent::Status(HELP_TEXT.to_string()))
        .await?;

    loop {
        if conversation.suggestions_visible() {
            view.handle_event(ViewEvent::Suggestions(SUGGESTIONS.to_vec()))
                .await?;
        }
        view.handle_event(ViewEvent::Prompt).await?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            Some(()) = interrupts.recv() => {
                log::info!("Interrupt at the prompt, leaving chat");
                None
            }
        };
        let Some(line) = line else {
            break;
        };

        let command = match ChatCommand::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                view.handle_event(ViewEvent::Error(e.to_string())).await?;
                continue;
            }
        };

        if handle_command(conversation, command, view, interrupts)
            .await?
            .is_break()
        {
            break;
        }
    }

    Ok(())
}

/// Applies one chat command. Returns `Break` when the session should end.
async fn handle_command<P: ModelProvider>(
    conversation: &mut Conversation<P>,
    command: ChatCommand,
    view: &mut dyn ConversationView,
    interrupts: &mut Interrupts,
) -> AppResult<ControlFlow<()>> {
    match command {
        ChatCommand::Send(text) => {
            conversation.set_draft_text(text);
            send_interruptible(conversation, None, view, interrupts).await?;
        }
        ChatCommand::Suggest(_) if !conversation.suggestions_visible() => {
            view.handle_event(ViewEvent::Status(
                "Suggestions are offered before your first question".to_string(),
            ))
            .await?;
        }
        ChatCommand::Suggest(n) => match SUGGESTIONS.get(n.wrapping_sub(1)) {
            Some(suggestion) => {
                send_interruptible(conversation, Some(suggestion.prompt), view, interrupts)
                    .await?;
            }
            None => {
                view.handle_event(ViewEvent::Error(format!(
                    "Choose a suggestion between 1 and {}",
                    SUGGESTIONS.len()
                )))
                .await?;
            }
        },
        ChatCommand::Image(path) => match load_image(&path) {
            Ok(image) => {
                let status = format!("Attached {} ({})", path.display(), image.summary());
                conversation.select_image(Some(image));
                view.handle_event(ViewEvent::Status(status)).await?;
            }
            Err(e) => view.handle_event(ViewEvent::Error(e.to_string())).await?,
        },
        ChatCommand::ClearImage => {
            let status = match conversation.selected_image() {
                Some(_) => "Image cleared",
                None => "No image attached",
            };
            conversation.clear_image();
            view.handle_event(ViewEvent::Status(status.to_string()))
                .await?;
        }
        ChatCommand::History => {
            for message in conversation.messages() {
                view.handle_event(ViewEvent::Turn(message.clone())).await?;
            }
        }
        ChatCommand::Help => {
            view.handle_event(ViewEvent::Status(HELP_TEXT.to_string()))
                .await?;
        }
        ChatCommand::Quit => return Ok(ControlFlow::Break(())),
    }

    Ok(ControlFlow::Continue(()))
}

/// Sends while an interrupt cancels the request in flight.
async fn send_interruptible<P: ModelProvider>(
    conversation: &mut Conversation<P>,
    text_override: Option<&str>,
    view: &mut dyn ConversationView,
    interrupts: &mut Interrupts,
) -> AppResult<()> {
    if !conversation.can_send(text_override) {
        return Ok(());
    }

    let token = conversation.cancellation_token();
    let send = conversation.send(text_override, view);
    tokio::pin!(send);

    loop {
        tokio::select! {
            result = &mut send => return result.map(|_| ()),
            Some(()) = interrupts.recv() => {
                log::info!("Interrupt received, cancelling request");
                token.cancel();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::conversation::FAILURE_FALLBACK;
    use crate::display::testing::RecordingView;
    use crate::model::testing::{ScriptedProvider, scripted_client};
    use crate::model::{Part, Role};
    use crate::utils::image::encode_image;
    use clap::Parser;
    use std::io::Write;
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;
    use tokio::time::timeout;

    fn conversation(provider: &ScriptedProvider) -> Conversation<ScriptedProvider> {
        Conversation::new(scripted_client(provider))
    }

    fn interrupts() -> (mpsc::UnboundedSender<()>, Interrupts) {
        mpsc::unbounded_channel()
    }

    fn script(input: &'static str) -> Lines<BufReader<&'static [u8]>> {
        BufReader::new(input.as_bytes()).lines()
    }

    #[tokio::test]
    async fn test_send_command_asks_the_model() {
        let provider = ScriptedProvider::new();
        provider.reply("Brotherly love, relief and truth.");
        let mut conversation = conversation(&provider);
        let mut view = RecordingView::default();
        let (_tx, mut rx) = interrupts();

        let flow = handle_command(
            &mut conversation,
            ChatCommand::Send("What are the tenets?".to_string()),
            &mut view,
            &mut rx,
        )
        .await
        .unwrap();

        assert!(flow.is_continue());
        assert_eq!(provider.call_count(), 1);
        let messages = conversation.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].text(), "What are the tenets?");
        assert_eq!(messages[2].text(), "Brotherly love, relief and truth.");
    }

    #[tokio::test]
    async fn test_failed_image_load_keeps_previous_selection() {
        let provider = ScriptedProvider::new();
        let mut conversation = conversation(&provider);
        let mut view = RecordingView::default();
        let (_tx, mut rx) = interrupts();
        let image = encode_image(b"compasses", "image/png").unwrap();
        conversation.select_image(Some(image.clone()));

        let dir = tempfile::tempdir().unwrap();
        for path in [dir.path().join("missing.png"), dir.path().join("notes.txt")] {
            handle_command(
                &mut conversation,
                ChatCommand::Image(path),
                &mut view,
                &mut rx,
            )
            .await
            .unwrap();
        }

        assert_eq!(view.errors().len(), 2);
        assert_eq!(conversation.selected_image(), Some(&image));
    }

    #[tokio::test]
    async fn test_image_command_attaches_file() {
        let provider = ScriptedProvider::new();
        let mut conversation = conversation(&provider);
        let mut view = RecordingView::default();
        let (_tx, mut rx) = interrupts();

        let mut file = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
        file.write_all(b"all-seeing eye").unwrap();

        handle_command(
            &mut conversation,
            ChatCommand::Image(file.path().to_path_buf()),
            &mut view,
            &mut rx,
        )
        .await
        .unwrap();

        let selected = conversation.selected_image().unwrap().decode().unwrap();
        assert_eq!(selected.mime_type, "image/jpeg");
        assert!(view.statuses()[0].starts_with("Attached"));

        handle_command(&mut conversation, ChatCommand::ClearImage, &mut view, &mut rx)
            .await
            .unwrap();
        assert!(conversation.selected_image().is_none());
        assert_eq!(view.statuses().last(), Some(&"Image cleared"));
    }

    #[tokio::test]
    async fn test_suggest_out_of_range_shows_error() {
        let provider = ScriptedProvider::new();
        let mut conversation = conversation(&provider);
        let mut view = RecordingView::default();
        let (_tx, mut rx) = interrupts();

        for n in [0, SUGGESTIONS.len() + 1] {
            handle_command(&mut conversation, ChatCommand::Suggest(n), &mut view, &mut rx)
                .await
                .unwrap();
        }

        assert_eq!(view.errors().len(), 2);
        assert_eq!(provider.call_count(), 0);
        assert_eq!(conversation.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_suggest_sends_suggested_prompt() {
        let provider = ScriptedProvider::new();
        provider.reply("It marks the centre of the Lodge.");
        let mut conversation = conversation(&provider);
        let mut view = RecordingView::default();
        let (_tx, mut rx) = interrupts();

        handle_command(&mut conversation, ChatCommand::Suggest(3), &mut view, &mut rx)
            .await
            .unwrap();

        assert_eq!(conversation.messages()[1].text(), SUGGESTIONS[2].prompt);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_suggest_ignored_after_first_question() {
        let provider = ScriptedProvider::new();
        provider.reply("Subdue your passions.");
        let mut conversation = conversation(&provider);
        let mut view = RecordingView::default();
        let (_tx, mut rx) = interrupts();

        handle_command(
            &mut conversation,
            ChatCommand::Send("What is the Compass?".to_string()),
            &mut view,
            &mut rx,
        )
        .await
        .unwrap();
        assert!(!conversation.suggestions_visible());

        handle_command(&mut conversation, ChatCommand::Suggest(1), &mut view, &mut rx)
            .await
            .unwrap();

        assert_eq!(provider.call_count(), 1);
        assert_eq!(conversation.messages().len(), 3);
        assert!(view.errors().is_empty());
    }

    #[tokio::test]
    async fn test_interrupt_while_thinking_cancels_request() {
        // Nothing queued, so the request stays in flight until interrupted
        let provider = ScriptedProvider::new();
        let mut conversation = conversation(&provider);
        let mut view = RecordingView::default();
        let (tx, mut rx) = interrupts();
        tx.send(()).unwrap();

        handle_command(
            &mut conversation,
            ChatCommand::Send("A question with no end".to_string()),
            &mut view,
            &mut rx,
        )
        .await
        .unwrap();

        assert_eq!(conversation.messages()[2].role(), Role::Model);
        assert_eq!(conversation.messages()[2].text(), FAILURE_FALLBACK);
        assert!(!conversation.is_thinking());
        assert!(!conversation.cancellation_token().is_cancelled());
    }

    #[tokio::test]
    async fn test_quit_ends_session() {
        let provider = ScriptedProvider::new();
        let mut conversation = conversation(&provider);
        let mut view = RecordingView::default();
        let (_tx, mut rx) = interrupts();

        let flow = handle_command(&mut conversation, ChatCommand::Quit, &mut view, &mut rx)
            .await
            .unwrap();

        assert!(flow.is_break());
    }

    #[tokio::test]
    async fn test_interrupt_at_prompt_leaves_chat() {
        let provider = ScriptedProvider::new();
        let mut conversation = conversation(&provider);
        let mut view = RecordingView::default();
        let (tx, mut rx) = interrupts();

        // Stdin that never yields a line while the writer half is alive
        let (_writer, reader) = tokio::io::duplex(64);
        let lines = BufReader::new(reader).lines();
        tx.send(()).unwrap();

        chat_session(&mut conversation, &mut view, lines, &mut rx)
            .await
            .unwrap();

        assert_eq!(provider.call_count(), 0);
        assert_eq!(conversation.messages().len(), 1);
        assert!(matches!(view.events.last(), Some(ViewEvent::Prompt)));
    }

    #[tokio::test]
    async fn test_session_survives_interrupts_after_a_request() {
        let provider = ScriptedProvider::new();
        provider.reply("Meet upon the Level.");
        let mut conversation = conversation(&provider);
        let mut view = RecordingView::default();
        let (tx, mut rx) = interrupts();

        let (mut writer, reader) = tokio::io::duplex(256);
        let lines = BufReader::new(reader).lines();
        writer.write_all(b"What is the Level?\n").await.unwrap();

        {
            let session = chat_session(&mut conversation, &mut view, lines, &mut rx);
            tokio::pin!(session);
            let idle = timeout(Duration::from_millis(200), &mut session).await;
            assert!(idle.is_err(), "session should wait for more input");

            tx.send(()).unwrap();
            session.await.unwrap();
        }

        assert_eq!(provider.call_count(), 1);
        assert_eq!(conversation.messages().len(), 3);
        assert_eq!(conversation.messages()[2].text(), "Meet upon the Level.");
    }

    #[tokio::test]
    async fn test_session_runs_commands_until_quit() {
        let provider = ScriptedProvider::new();
        provider.reply("Let it divest you of vice.");
        let mut conversation = conversation(&provider);
        let mut view = RecordingView::default();
        let (_tx, mut rx) = interrupts();

        let input = "/bogus\n/suggest 2\n\n/quit\nnever sent\n";
        chat_session(&mut conversation, &mut view, script(input), &mut rx)
            .await
            .unwrap();

        assert_eq!(provider.call_count(), 1);
        let call = &provider.calls()[0];
        assert_eq!(
            call.turns.last().unwrap().parts,
            vec![Part::Text(SUGGESTIONS[1].prompt.to_string())]
        );
        assert_eq!(view.errors().len(), 1);
        assert_eq!(conversation.messages().len(), 3);
        assert!(
            view.events
                .iter()
                .any(|event| matches!(event, ViewEvent::Suggestions(s) if s.len() == 3))
        );
    }

    #[tokio::test]
    async fn test_session_ends_at_end_of_input() {
        let provider = ScriptedProvider::new();
        provider.reply("Truth is a divine attribute.");
        let mut conversation = conversation(&provider);
        let mut view = RecordingView::default();
        let (_tx, mut rx) = interrupts();

        chat_session(&mut conversation, &mut view, script("What is Truth?"), &mut rx)
            .await
            .unwrap();

        assert_eq!(conversation.messages().len(), 3);
    }

    #[tokio::test]
    async fn test_one_shot_without_prompt_or_image_is_invalid() {
        let cli = Cli::parse_from(["mentor"]);

        let result = process_prompt(&cli).await;

        assert!(matches!(result, Err(AppError::InvalidInput)));
    }

    #[tokio::test]
    async fn test_one_shot_with_unreadable_image_fails_before_sending() {
        let cli = Cli::parse_from(["mentor", "--image", "symbol.doc", "What is this?"]);

        let result = process_prompt(&cli).await;

        assert!(matches!(result, Err(AppError::UnsupportedImage(_))));
    }
}
