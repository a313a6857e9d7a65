use iced::futures::{SinkExt, Stream};
use iced::widget::{button, column, container, image, progress_bar, row, text, text_input, Column};
use iced::{stream, Alignment, Element, Length, Size, Task, Theme};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

// Declare the application modules
mod state;
mod storage;
mod ui;

use state::operation::{Action, Operation};
use state::session::Session;
use storage::{ObjectStore, ProgressFn, S3Store, MAX_DOWNLOAD_BYTES};
use ui::toast::{Toast, TOAST_DURATION};

/// How long the upload confirmation stays up before the screen resets
const RESET_DELAY: Duration = Duration::from_secs(3);

/// Main application state
struct UpPic {
    /// Remote object store the three actions run against
    store: Arc<dyn ObjectStore>,
    /// Title input, picked image, and field error
    session: Session,
    /// Lifecycle of the current remote operation
    operation: Operation,
    /// What the preview is currently showing
    preview: image::Handle,
    /// Transient notification, if one is up
    toast: Option<Toast>,
    /// Token so an expiry can't dismiss a newer toast
    toast_seq: u64,
    /// Token so a stale delayed reset can't clobber a newer action
    reset_epoch: u64,
}

/// Events flowing out of the upload progress stream
#[derive(Debug, Clone)]
enum UploadEvent {
    Progress(u8),
    Finished(Result<(), String>),
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked "Select Image"
    PickImage,
    /// The picker request resolved (None when the dialog was dismissed)
    ImagePicked(Option<PathBuf>),
    /// Title input changed
    TitleChanged(String),
    /// User clicked "Upload"
    UploadPressed,
    /// Upload progress or completion from the background task
    UploadAdvanced(UploadEvent),
    /// User clicked "Download"
    DownloadPressed,
    /// Download finished with a decoded preview or an error message
    DownloadComplete(Result<image::Handle, String>),
    /// User clicked "Delete"
    DeletePressed,
    /// Delete finished
    DeleteComplete(Result<(), String>),
    /// The post-upload delay elapsed; reset if the token is still current
    ResetDelayElapsed(u64),
    /// A toast timed out; dismiss it if the token is still current
    ToastExpired(u64),
}

impl UpPic {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        // Credentials and bucket settings may live in a .env file
        let _ = dotenvy::dotenv();

        // If this fails, we panic because the app cannot function without
        // its bucket
        let store = S3Store::from_env()
            .expect("Failed to initialize the object store. Set UPPIC_S3_BUCKET and credentials.");

        (Self::with_store(Arc::new(store)), Task::none())
    }

    /// Build the screen over any backend (tests use the in-memory store)
    fn with_store(store: Arc<dyn ObjectStore>) -> Self {
        UpPic {
            store,
            session: Session::new(),
            operation: Operation::Idle,
            preview: ui::preview::placeholder(),
            toast: None,
            toast_seq: 0,
            reset_epoch: 0,
        }
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PickImage => {
                if self.operation.is_in_flight() {
                    return self.reject_busy();
                }
                Task::perform(pick_image(), Message::ImagePicked)
            }
            Message::ImagePicked(Some(path)) => match ui::preview::from_path(&path) {
                Ok(handle) => {
                    self.preview = handle;
                    self.session.picked = Some(path);
                    Task::none()
                }
                Err(e) => {
                    self.session.picked = None;
                    self.show_toast(Toast::error(format!("Could not read image: {}", e)))
                }
            },
            Message::ImagePicked(None) => Task::none(),
            Message::TitleChanged(title) => {
                self.session.title = title;
                Task::none()
            }
            Message::UploadPressed => {
                if self.operation.is_in_flight() {
                    return self.reject_busy();
                }
                let Some(source) = self.session.picked.clone() else {
                    return self.show_toast(Toast::info("Select an image first"));
                };
                let Some(title) = self.session.require_title() else {
                    return Task::none();
                };

                self.operation = Operation::determinate(Action::Upload);
                self.reset_epoch += 1;
                println!("⬆️  Uploading {} as '{}'", source.display(), title);

                Task::run(
                    upload_stream(self.store.clone(), title, source),
                    Message::UploadAdvanced,
                )
            }
            Message::UploadAdvanced(UploadEvent::Progress(percent)) => {
                self.operation.advance(percent);
                Task::none()
            }
            Message::UploadAdvanced(UploadEvent::Finished(Ok(()))) => {
                self.operation = Operation::Success {
                    action: Action::Upload,
                };
                let epoch = self.reset_epoch;
                Task::batch([
                    self.show_toast(Toast::success("Successfully uploaded")),
                    Task::perform(
                        async move { tokio::time::sleep(RESET_DELAY).await },
                        move |_| Message::ResetDelayElapsed(epoch),
                    ),
                ])
            }
            Message::UploadAdvanced(UploadEvent::Finished(Err(message))) => {
                eprintln!("❌ Upload failed: {}", message);
                self.reset_layout();
                self.show_toast(Toast::error(message))
            }
            Message::DownloadPressed => {
                if self.operation.is_in_flight() {
                    return self.reject_busy();
                }
                let Some(title) = self.session.require_title() else {
                    return Task::none();
                };

                self.operation = Operation::indeterminate(Action::Download);
                self.reset_epoch += 1;

                Task::perform(
                    download_image(self.store.clone(), title),
                    Message::DownloadComplete,
                )
            }
            Message::DownloadComplete(Ok(handle)) => {
                self.preview = handle;
                self.operation = Operation::Idle;
                Task::none()
            }
            Message::DownloadComplete(Err(message)) => {
                eprintln!("❌ Download failed: {}", message);
                self.session.field_error = Some(message.clone());
                self.operation = Operation::Failed {
                    action: Action::Download,
                    message,
                };
                self.preview = ui::preview::placeholder();
                Task::none()
            }
            Message::DeletePressed => {
                if self.operation.is_in_flight() {
                    return self.reject_busy();
                }
                let Some(title) = self.session.require_title() else {
                    return Task::none();
                };

                self.operation = Operation::indeterminate(Action::Delete);
                self.reset_epoch += 1;

                let store = self.store.clone();
                Task::perform(
                    async move { store.delete(&title).await.map_err(|e| e.to_string()) },
                    Message::DeleteComplete,
                )
            }
            Message::DeleteComplete(Ok(())) => {
                self.reset_layout();
                self.show_toast(Toast::success("Successfully deleted image"))
            }
            Message::DeleteComplete(Err(message)) => {
                eprintln!("❌ Delete failed: {}", message);
                self.session.field_error = Some(message.clone());
                self.operation = Operation::Failed {
                    action: Action::Delete,
                    message,
                };
                Task::none()
            }
            Message::ResetDelayElapsed(epoch) => {
                if epoch == self.reset_epoch {
                    self.reset_layout();
                }
                Task::none()
            }
            Message::ToastExpired(seq) => {
                if seq == self.toast_seq {
                    self.toast = None;
                }
                Task::none()
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let preview = container(
            image(self.preview.clone())
                .width(Length::Fixed(320.0))
                .height(Length::Fixed(320.0)),
        )
        .center_x(Length::Fill);

        let mut title_field = Column::new().spacing(4).push(
            text_input("Title", &self.session.title)
                .on_input(Message::TitleChanged)
                .padding(10),
        );
        if let Some(error) = &self.session.field_error {
            title_field = title_field.push(text(error).size(13).style(text::danger));
        }

        let controls = row![
            button("Select Image").on_press(Message::PickImage).padding(10),
            button("Upload").on_press(Message::UploadPressed).padding(10),
            button("Download").on_press(Message::DownloadPressed).padding(10),
            button("Delete").on_press(Message::DeletePressed).padding(10),
        ]
        .spacing(10);

        let mut content = column![preview, title_field, controls]
            .spacing(20)
            .padding(30)
            .align_x(Alignment::Center);

        match &self.operation {
            Operation::InProgress {
                percent: Some(percent),
                ..
            } => {
                content = content
                    .push(progress_bar(0.0..=100.0, f32::from(*percent)))
                    .push(text(format!("Loading... {}%", percent)).size(14));
            }
            Operation::InProgress { percent: None, .. } => {
                content = content.push(text("Loading...").size(14));
            }
            _ => {}
        }

        if let Some(toast) = &self.toast {
            content = content.push(ui::toast::view(toast));
        }

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }

    /// Reject a trigger that arrived while an operation is in flight
    fn reject_busy(&mut self) -> Task<Message> {
        self.show_toast(Toast::info("Another operation is still in progress"))
    }

    /// Show a toast and schedule its dismissal
    fn show_toast(&mut self, toast: Toast) -> Task<Message> {
        self.toast_seq += 1;
        let seq = self.toast_seq;
        self.toast = Some(toast);

        Task::perform(
            async move { tokio::time::sleep(TOAST_DURATION).await },
            move |_| Message::ToastExpired(seq),
        )
    }

    /// Clear the whole screen back to the pristine state
    fn reset_layout(&mut self) {
        self.session.reset();
        self.preview = ui::preview::placeholder();
        self.operation = Operation::Idle;
        self.reset_epoch += 1;
    }
}

fn main() -> iced::Result {
    iced::application("UpPic", UpPic::update, UpPic::view)
        .theme(UpPic::theme)
        .window_size(Size::new(420.0, 680.0))
        .centered()
        .run_with(UpPic::new)
}

/// Ask the system for a single image file; resolves to the chosen path
async fn pick_image() -> Option<PathBuf> {
    rfd::AsyncFileDialog::new()
        .set_title("Select Image")
        .add_filter("Images", &["png", "jpg", "jpeg", "gif", "webp", "bmp"])
        .pick_file()
        .await
        .map(|file| file.path().to_path_buf())
}

/// Stream a local file to the store, emitting progress and then completion
fn upload_stream(
    store: Arc<dyn ObjectStore>,
    title: String,
    source: PathBuf,
) -> impl Stream<Item = UploadEvent> {
    stream::channel(32, move |mut output| async move {
        let progress = output.clone();
        let on_progress: ProgressFn = Box::new(move |percent| {
            let mut progress = progress.clone();
            let _ = progress.try_send(UploadEvent::Progress(percent));
        });

        let result = store
            .put(&title, &source, on_progress)
            .await
            .map_err(|e| e.to_string());

        let _ = output.send(UploadEvent::Finished(result)).await;
    })
}

/// Fetch an object and decode it into a preview handle
async fn download_image(
    store: Arc<dyn ObjectStore>,
    title: String,
) -> Result<image::Handle, String> {
    let bytes = store
        .get(&title, MAX_DOWNLOAD_BYTES)
        .await
        .map_err(|e| e.to_string())?;

    // Spawn blocking because decoding is CPU-intensive
    tokio::task::spawn_blocking(move || {
        ui::preview::from_bytes(&bytes).map_err(|e| format!("Failed to decode image: {}", e))
    })
    .await
    .map_err(|e| format!("Task join error: {}", e))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::session::REQUIRED_MARK;
    use crate::storage::MemoryStore;
    use crate::ui::toast::Kind;

    fn screen() -> (UpPic, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (UpPic::with_store(store.clone()), store)
    }

    #[test]
    fn test_blank_title_blocks_download_and_delete() {
        let (mut app, store) = screen();
        app.session.title = "   ".to_string();

        let _ = app.update(Message::DownloadPressed);
        assert_eq!(app.session.field_error.as_deref(), Some(REQUIRED_MARK));
        assert_eq!(app.operation, Operation::Idle);

        let _ = app.update(Message::DeletePressed);
        assert_eq!(app.session.field_error.as_deref(), Some(REQUIRED_MARK));
        assert_eq!(app.operation, Operation::Idle);

        assert_eq!(store.calls(), 0);
    }

    #[test]
    fn test_upload_without_image_shows_notice() {
        let (mut app, store) = screen();
        app.session.title = "vacation.png".to_string();

        let _ = app.update(Message::UploadPressed);

        assert_eq!(app.operation, Operation::Idle);
        let toast = app.toast.as_ref().expect("a notice toast");
        assert_eq!(toast.kind, Kind::Info);
        assert_eq!(store.calls(), 0);
    }

    #[test]
    fn test_upload_trigger_goes_determinate() {
        let (mut app, _store) = screen();
        app.session.picked = Some(PathBuf::from("/tmp/holiday.png"));
        app.session.title = "  vacation.png  ".to_string();

        let _ = app.update(Message::UploadPressed);

        assert_eq!(app.operation, Operation::determinate(Action::Upload));
        assert_eq!(app.session.field_error, None);
    }

    #[test]
    fn test_upload_success_then_delayed_reset_clears_the_screen() {
        let (mut app, _store) = screen();
        app.session.picked = Some(PathBuf::from("/tmp/holiday.png"));
        app.session.title = "vacation.png".to_string();

        let _ = app.update(Message::UploadPressed);
        let _ = app.update(Message::UploadAdvanced(UploadEvent::Progress(40)));
        assert_eq!(app.operation.percent(), Some(40));

        let _ = app.update(Message::UploadAdvanced(UploadEvent::Finished(Ok(()))));
        assert_eq!(
            app.operation,
            Operation::Success {
                action: Action::Upload
            }
        );

        let epoch = app.reset_epoch;
        let _ = app.update(Message::ResetDelayElapsed(epoch));

        assert_eq!(app.operation, Operation::Idle);
        assert!(app.session.title.is_empty());
        assert_eq!(app.session.picked, None);
    }

    #[test]
    fn test_stale_delayed_reset_is_ignored() {
        let (mut app, _store) = screen();
        app.session.picked = Some(PathBuf::from("/tmp/holiday.png"));
        app.session.title = "vacation.png".to_string();

        let _ = app.update(Message::UploadPressed);
        let _ = app.update(Message::UploadAdvanced(UploadEvent::Finished(Ok(()))));
        let stale_epoch = app.reset_epoch;

        // a new action starts before the delay fires
        let _ = app.update(Message::TitleChanged("other.png".to_string()));
        let _ = app.update(Message::DownloadPressed);
        assert_eq!(app.operation, Operation::indeterminate(Action::Download));

        let _ = app.update(Message::ResetDelayElapsed(stale_epoch));

        assert_eq!(app.operation, Operation::indeterminate(Action::Download));
        assert_eq!(app.session.title, "other.png");
    }

    #[test]
    fn test_upload_failure_resets_and_toasts_the_message() {
        let (mut app, _store) = screen();
        app.session.picked = Some(PathBuf::from("/tmp/holiday.png"));
        app.session.title = "vacation.png".to_string();

        let _ = app.update(Message::UploadPressed);
        let _ = app.update(Message::UploadAdvanced(UploadEvent::Finished(Err(
            "storage request failed: timeout".to_string(),
        ))));

        assert_eq!(app.operation, Operation::Idle);
        assert!(app.session.title.is_empty());
        assert_eq!(app.session.picked, None);
        let toast = app.toast.as_ref().expect("an error toast");
        assert_eq!(toast.kind, Kind::Error);
    }

    #[test]
    fn test_download_failure_sets_field_error() {
        let (mut app, _store) = screen();
        app.session.title = "missing.png".to_string();

        let _ = app.update(Message::DownloadPressed);
        assert_eq!(app.operation, Operation::indeterminate(Action::Download));

        let _ = app.update(Message::DownloadComplete(Err(
            "object does not exist: missing.png".to_string(),
        )));

        assert!(!app.operation.is_in_flight());
        assert_eq!(
            app.session.field_error.as_deref(),
            Some("object does not exist: missing.png")
        );
    }

    #[test]
    fn test_delete_success_resets_and_toasts() {
        let (mut app, _store) = screen();
        app.session.title = "vacation.png".to_string();

        let _ = app.update(Message::DeletePressed);
        let _ = app.update(Message::DeleteComplete(Ok(())));

        assert_eq!(app.operation, Operation::Idle);
        assert!(app.session.title.is_empty());
        let toast = app.toast.as_ref().expect("a success toast");
        assert_eq!(toast.kind, Kind::Success);
    }

    #[test]
    fn test_busy_trigger_is_rejected() {
        let (mut app, _store) = screen();
        app.session.title = "vacation.png".to_string();

        let _ = app.update(Message::DownloadPressed);
        assert_eq!(app.operation, Operation::indeterminate(Action::Download));

        let _ = app.update(Message::DeletePressed);

        assert_eq!(app.operation, Operation::indeterminate(Action::Download));
        let toast = app.toast.as_ref().expect("a busy notice");
        assert_eq!(toast.kind, Kind::Info);
    }

    #[test]
    fn test_newer_toast_survives_stale_expiry() {
        let (mut app, _store) = screen();
        app.session.title = "vacation.png".to_string();

        let _ = app.update(Message::DeletePressed);
        let _ = app.update(Message::DeleteComplete(Ok(())));
        let stale_seq = app.toast_seq;

        // a second toast replaces the first before its expiry fires
        let _ = app.update(Message::UploadPressed);
        assert_eq!(app.toast.as_ref().map(|t| t.kind), Some(Kind::Info));

        let _ = app.update(Message::ToastExpired(stale_seq));
        assert!(app.toast.is_some());

        let _ = app.update(Message::ToastExpired(app.toast_seq));
        assert_eq!(app.toast, None);
    }
}
