//! Event loop coordination: read arm, command arm and init-request timer.

use crate::{
    config::Config,
    engine::SharedEngine,
    errors::VlcdError,
    messages::{DisplayEvent, InputCommand},
    transport::{self, OutboundLink},
};
use bytes::BytesMut;
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::select;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use vlcd_input::InputDispatcher;
use vlcd_protocol::InputEvent;

const READ_CHUNK: usize = 64 * 1024;

/// Engine observed through the application's event channel.
pub type ChannelEngine = SharedEngine<flume::Sender<DisplayEvent>>;

/// Spawns the loop for one connected stream.
///
/// The loop runs until the stream reaches EOF, an I/O error occurs, the
/// application sends [`InputCommand::Close`], or the command channel closes.
/// On exit the screen is disabled and `ConnectionClosed` is delivered.
pub(crate) fn spawn<S>(
    stream: S,
    config: Config,
    engine: ChannelEngine,
    commands: flume::Receiver<InputCommand>,
    events: flume::Sender<DisplayEvent>,
) -> JoinHandle<()>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = run(stream, &config, &engine, &commands).await {
            warn!("connection ended with error: {}", e);
            emit(
                &events,
                DisplayEvent::Error {
                    message: e.to_string(),
                },
            );
        }
        engine.lock().disable();
        // The final event waits for room so readers always see it.
        if events.send_async(DisplayEvent::ConnectionClosed).await.is_err() {
            debug!("event receiver gone before close");
        }
    })
}

async fn run<S>(
    stream: S,
    config: &Config,
    engine: &ChannelEngine,
    commands: &flume::Receiver<InputCommand>,
) -> Result<(), VlcdError>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (mut reader, writer) = tokio::io::split(stream);
    let (link, outbound) = OutboundLink::bounded(config.channels.outbound_capacity);
    let mut writer_task = transport::spawn_writer(writer, outbound);

    let mut dispatcher = InputDispatcher::with_throttle(config.input.throttle());
    dispatcher.set_device_mask(engine.lock().screen().devices);

    let mut init_timer = tokio::time::interval(config.init_request_interval());
    init_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut buf = BytesMut::with_capacity(READ_CHUNK);

    let result = loop {
        select! {
            res = reader.read_buf(&mut buf) => {
                match res {
                    Ok(0) => {
                        info!("device closed the connection");
                        break Ok(());
                    }
                    Ok(_) => {
                        let devices = {
                            let mut engine = engine.lock();
                            engine.feed(&buf);
                            engine.screen().devices
                        };
                        buf.clear();
                        dispatcher.set_device_mask(devices);
                    }
                    Err(e) => break Err(VlcdError::Transport(e)),
                }
            }

            cmd = commands.recv_async() => {
                match cmd {
                    Ok(InputCommand::Close) => {
                        debug!("close requested");
                        break Ok(());
                    }
                    Ok(command) => link.send_all(translate(&mut dispatcher, command)),
                    Err(_) => {
                        debug!("command channel closed");
                        break Ok(());
                    }
                }
            }

            _ = init_timer.tick() => {
                let enabled = engine.lock().screen().enabled;
                if let Some(request) = dispatcher.init_request(enabled) {
                    debug!("requesting init");
                    link.try_send(request);
                }
            }

            res = &mut writer_task => {
                break match res {
                    Ok(Ok(())) => Err(VlcdError::ConnectionClosed),
                    Ok(Err(e)) => Err(e),
                    Err(e) => Err(VlcdError::Internal(format!("writer task failed: {e}"))),
                };
            }
        }
    };

    if !writer_task.is_finished() {
        // Let the writer flush what is queued, then stop it.
        drop(link);
        if let Err(e) = writer_task.await {
            debug!("writer task ended abnormally: {}", e);
        }
    }
    result
}

/// Translates one application command into device events.
fn translate(dispatcher: &mut InputDispatcher, command: InputCommand) -> Vec<InputEvent> {
    match command {
        InputCommand::MouseButton {
            button,
            pressed,
            position,
        } => dispatcher.mouse_button(button, pressed, position),
        InputCommand::MouseMove { position } => dispatcher.mouse_move(position, Instant::now()),
        InputCommand::MouseWheel { delta } => dispatcher.mouse_wheel(delta),
        InputCommand::EncoderPress { pressed } => dispatcher.encoder_press(pressed),
        InputCommand::EncoderRotate { delta } => dispatcher.encoder_rotate(delta),
        InputCommand::Key(key) => dispatcher.key(&key),
        InputCommand::Button { index, pressed } => dispatcher.button(index, pressed),
        InputCommand::Close => Vec::new(),
    }
}

/// Sends a lifecycle event without blocking the loop.
pub(crate) fn emit(events: &flume::Sender<DisplayEvent>, event: DisplayEvent) {
    if let Err(e) = events.try_send(event) {
        debug!("event dropped: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vlcd_common::{InputDeviceMask, Point};
    use vlcd_input::{KeyInput, MouseButton};

    #[test]
    fn test_translate_key() {
        let mut d = InputDispatcher::new();
        let out = translate(
            &mut d,
            InputCommand::Key(KeyInput::new(30, true).with_text("a")),
        );
        assert_eq!(
            out,
            vec![InputEvent::Keyboard {
                pressed: true,
                repeat: false,
                keycode: 30,
                modifiers: 0,
                ascii: b'a',
            }]
        );
    }

    #[test]
    fn test_translate_respects_mask() {
        let mut d = InputDispatcher::new();
        d.set_device_mask(InputDeviceMask::BUTTON);
        assert!(translate(
            &mut d,
            InputCommand::MouseButton {
                button: MouseButton::Right,
                pressed: true,
                position: Point::new(1, 1),
            }
        )
        .is_empty());
        assert_eq!(
            translate(
                &mut d,
                InputCommand::Button {
                    index: 4,
                    pressed: false
                }
            ),
            vec![InputEvent::Button {
                index: 4,
                pressed: false
            }]
        );
    }

    #[test]
    fn test_close_translates_to_nothing() {
        let mut d = InputDispatcher::new();
        assert!(translate(&mut d, InputCommand::Close).is_empty());
    }
}
