use std::{sync::Arc, thread};

use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use image::GenericImageView;
use shelf_core::{
    config::Settings, HttpShelfClient, Order, Section, ShelfSource, ShelfTransport, TitleCard,
    UpdateRequest,
};
use url::Url;

use crate::backend_bridge::commands::{ActionKey, ActionSource, BackendCommand};
use crate::controller::events::{UiError, UiErrorContext, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;
use crate::controller::reducer::{apply_event, CardUi, PosterState, ShelfUi};

/// Rendered poster height when the shelf page declared none.
const DEFAULT_POSTER_HEIGHT: f32 = 220.0;
/// Decode-side cap; art is downscaled before it crosses the channel.
const POSTER_MAX_DECODE_DIMENSION: f32 = 480.0;
const POSTER_COLUMN_WIDTH: f32 = 150.0;

/// Decoded poster pixels, ready for texture upload on the UI thread.
#[derive(Clone)]
pub struct PosterImage {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

pub struct ShelfGuiApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    view: ShelfUi,
    status: String,
    settings: Settings,
    server_url_input: String,
    section: Section,
    order: Order,
}

impl ShelfGuiApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        settings: Settings,
    ) -> Self {
        let mut app = Self {
            cmd_tx,
            ui_rx,
            view: ShelfUi::default(),
            status: "Starting backend worker".to_string(),
            server_url_input: settings.server_url.clone(),
            settings,
            section: Section::Movies,
            order: Order::Title,
        };
        app.reconfigure_and_reload();
        app
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            if let Some(status) = apply_event(&mut self.view, event) {
                self.status = status;
            }
        }
    }

    /// Points the backend at the URL in the input field, then reloads the
    /// current listing. Nothing is sent when the URL does not parse.
    fn reconfigure_and_reload(&mut self) {
        match Url::parse(self.server_url_input.trim()) {
            Ok(server_url) => {
                let configured = dispatch_backend_command(
                    &self.cmd_tx,
                    BackendCommand::Configure {
                        server_url,
                        csrf_cookie: self.settings.csrf_cookie.clone(),
                        update_timeout: self.settings.update_timeout(),
                    },
                    &mut self.status,
                );
                if configured {
                    self.load_current_listing();
                }
            }
            Err(err) => {
                self.status = format!("Invalid server URL: {err}");
            }
        }
    }

    fn load_current_listing(&mut self) {
        dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::LoadShelf {
                source: ShelfSource::listing(self.section, self.order),
            },
            &mut self.status,
        );
    }

    fn submit_search(&mut self) {
        let query = self.view.search_text.trim().to_string();
        if query.is_empty() {
            return;
        }
        dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::LoadShelf {
                source: ShelfSource::search(query),
            },
            &mut self.status,
        );
    }

    fn render_top_bar(&mut self, ctx: &egui::Context, interactive: bool) {
        egui::TopBottomPanel::top("shelf_top_bar").show(ctx, |ui| {
            ui.add_enabled_ui(interactive, |ui| {
                ui.horizontal(|ui| {
                    let mut listing_changed = false;
                    egui::ComboBox::from_id_salt("shelf_section")
                        .selected_text(section_label(self.section))
                        .show_ui(ui, |ui| {
                            listing_changed |= ui
                                .selectable_value(&mut self.section, Section::Movies, "Movies")
                                .changed();
                            listing_changed |= ui
                                .selectable_value(&mut self.section, Section::Tv, "TV")
                                .changed();
                        });
                    egui::ComboBox::from_id_salt("shelf_order")
                        .selected_text(order_label(self.order))
                        .show_ui(ui, |ui| {
                            listing_changed |= ui
                                .selectable_value(&mut self.order, Order::Title, "Title")
                                .changed();
                            listing_changed |= ui
                                .selectable_value(&mut self.order, Order::Mtime, "Modified")
                                .changed();
                            listing_changed |= ui
                                .selectable_value(&mut self.order, Order::Rating, "Rating")
                                .changed();
                        });
                    if listing_changed {
                        self.load_current_listing();
                    }

                    ui.separator();
                    let search = ui.add(
                        egui::TextEdit::singleline(&mut self.view.search_text)
                            .hint_text("Search titles")
                            .desired_width(180.0),
                    );
                    let search_submitted =
                        search.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                    if ui.button("Search").clicked() || search_submitted {
                        self.submit_search();
                    }

                    ui.separator();
                    ui.label("Server:");
                    ui.add(
                        egui::TextEdit::singleline(&mut self.server_url_input)
                            .desired_width(220.0),
                    );
                    if ui.button("Reload").clicked() {
                        self.reconfigure_and_reload();
                    }
                });
            });
        });
    }

    fn render_status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("shelf_status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.view.loading_shelf {
                    ui.spinner();
                }
                ui.label(&self.status);
            });
        });
    }

    fn render_shelf(&mut self, ctx: &egui::Context, interactive: bool) {
        let Self {
            cmd_tx,
            view,
            status,
            ..
        } = self;
        let ShelfUi {
            shelf,
            generation,
            cards,
            ..
        } = view;
        let generation = *generation;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(interactive, |ui| {
                let Some(shelf) = shelf.as_mut() else {
                    ui.centered_and_justified(|ui| {
                        ui.label("No shelf loaded yet.");
                    });
                    return;
                };
                if shelf.cards.is_empty() {
                    ui.label("No titles on this shelf.");
                    return;
                }
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        for (index, card) in shelf.cards.iter_mut().enumerate() {
                            let Some(card_ui) = cards.get_mut(index) else {
                                continue;
                            };
                            render_card(ui, cmd_tx, status, generation, index, card, card_ui);
                            ui.add_space(8.0);
                        }
                    });
            });
        });
    }

    fn render_error_dialog(&mut self, ctx: &egui::Context) {
        let Some(dialog) = &self.view.error_dialog else {
            return;
        };

        let mut dismissed = false;
        egui::Window::new(dialog.title)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label(&dialog.message);
                ui.add_space(8.0);
                ui.vertical_centered(|ui| {
                    if ui.button("OK").clicked() {
                        dismissed = true;
                    }
                });
            });
        if dismissed {
            self.view.error_dialog = None;
        }
    }
}

impl eframe::App for ShelfGuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        // The error dialog is modal: the shelf underneath goes inert until
        // the dialog is dismissed.
        let interactive = self.view.error_dialog.is_none();
        self.render_top_bar(ctx, interactive);
        self.render_status_bar(ctx);
        self.render_shelf(ctx, interactive);
        self.render_error_dialog(ctx);

        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}

fn section_label(section: Section) -> &'static str {
    match section {
        Section::Movies => "Movies",
        Section::Tv => "TV",
    }
}

fn order_label(order: Order) -> &'static str {
    match order {
        Order::Title => "Title",
        Order::Mtime => "Modified",
        Order::Rating => "Rating",
    }
}

fn render_card(
    ui: &mut egui::Ui,
    cmd_tx: &Sender<BackendCommand>,
    status: &mut String,
    generation: u64,
    index: usize,
    card: &mut TitleCard,
    card_ui: &mut CardUi,
) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.horizontal_top(|ui| {
            render_poster(ui, cmd_tx, status, generation, index, card, &mut card_ui.poster);
            ui.vertical(|ui| {
                let rating = ui
                    .add(
                        egui::Button::new(egui::RichText::new(&card.rating_line).strong())
                            .frame(false),
                    )
                    .on_hover_text("Click to show other matches");
                if rating.clicked() {
                    card.candidates.click_rating();
                }
                ui.label(&card.blurb);
                if card.candidates.is_visible() {
                    ui.add_space(4.0);
                    render_candidates(ui, cmd_tx, status, generation, index, card, card_ui);
                }
            });
        });
    });
}

fn render_candidates(
    ui: &mut egui::Ui,
    cmd_tx: &Sender<BackendCommand>,
    status: &mut String,
    generation: u64,
    index: usize,
    card: &mut TitleCard,
    card_ui: &mut CardUi,
) {
    for entry_index in 0..card.candidates.entries.len() {
        let source = ActionSource::Candidate(entry_index);
        ui.horizontal(|ui| {
            let clicked = if card_ui.is_busy(source) {
                ui.spinner();
                false
            } else {
                ui.button("Use This Instead").clicked()
            };
            ui.label(&card.candidates.entries[entry_index].label);
            if clicked {
                let action = ActionKey {
                    generation,
                    card: index,
                    source,
                };
                let request = UpdateRequest {
                    title: card.title.clone(),
                    update_url: card.update_url.clone(),
                    chosen_url: card.candidates.entries[entry_index].url.clone(),
                    video_type: card.video_type,
                };
                if dispatch_backend_command(
                    cmd_tx,
                    BackendCommand::ApplyUpdate { action, request },
                    status,
                ) {
                    card_ui.busy.insert(source);
                }
            }
        });
    }

    // Last-resort row: paste a provider title URL directly.
    let manual_nonempty = card
        .candidates
        .manual_url()
        .map(|url| !url.trim().is_empty())
        .unwrap_or(false);
    let mut manual_submit = false;
    ui.horizontal(|ui| {
        if card_ui.is_busy(ActionSource::Manual) {
            ui.spinner();
        } else {
            manual_submit = ui
                .add_enabled(manual_nonempty, egui::Button::new("Use Title URL"))
                .clicked();
        }
        if let Some(manual_url) = card.candidates.manual_url_mut() {
            ui.add(
                egui::TextEdit::singleline(manual_url)
                    .hint_text("https://provider/title/...")
                    .desired_width(320.0),
            );
        }
    });
    if manual_submit {
        let chosen_url = card
            .candidates
            .manual_url()
            .map(|url| url.trim().to_string())
            .unwrap_or_default();
        let action = ActionKey {
            generation,
            card: index,
            source: ActionSource::Manual,
        };
        let request = UpdateRequest {
            title: card.title.clone(),
            update_url: card.update_url.clone(),
            chosen_url,
            video_type: card.video_type,
        };
        if dispatch_backend_command(
            cmd_tx,
            BackendCommand::ApplyUpdate { action, request },
            status,
        ) {
            card_ui.busy.insert(ActionSource::Manual);
            // The input empties at submit, not at settle.
            card.candidates.take_manual_url();
        }
    }
}

fn render_poster(
    ui: &mut egui::Ui,
    cmd_tx: &Sender<BackendCommand>,
    status: &mut String,
    generation: u64,
    index: usize,
    card: &TitleCard,
    poster_state: &mut PosterState,
) {
    let Some(poster) = &card.poster else {
        ui.add_sized(
            [POSTER_COLUMN_WIDTH, DEFAULT_POSTER_HEIGHT],
            egui::Label::new("no art"),
        );
        return;
    };
    let target_height = poster.height.map(|h| h as f32).unwrap_or(DEFAULT_POSTER_HEIGHT);

    if matches!(poster_state, PosterState::NotRequested) {
        *poster_state = PosterState::Loading;
        let queued = dispatch_backend_command(
            cmd_tx,
            BackendCommand::FetchPoster {
                generation,
                card: index,
                url: poster.src.clone(),
            },
            status,
        );
        if !queued {
            // Queue full; try again next frame.
            *poster_state = PosterState::NotRequested;
        }
    }

    match poster_state {
        PosterState::NotRequested | PosterState::Loading => {
            ui.add_sized([POSTER_COLUMN_WIDTH, target_height], egui::Spinner::new());
        }
        PosterState::Error(reason) => {
            ui.add_sized(
                [POSTER_COLUMN_WIDTH, target_height],
                egui::Label::new(
                    egui::RichText::new(format!("art unavailable: {reason}"))
                        .color(ui.visuals().error_fg_color),
                ),
            );
        }
        PosterState::Ready { image, texture } => {
            if texture.is_none() {
                let color_image = egui::ColorImage::from_rgba_unmultiplied(
                    [image.width, image.height],
                    &image.rgba,
                );
                *texture = Some(ui.ctx().load_texture(
                    format!("poster_{index}"),
                    color_image,
                    egui::TextureOptions::LINEAR,
                ));
            }
            if let Some(texture) = texture.as_ref() {
                let tex_size = texture.size_vec2();
                let scale = target_height / tex_size.y.max(1.0);
                let size = egui::vec2(tex_size.x * scale, target_height);
                ui.add(egui::Image::new(texture).fit_to_exact_size(size));
            }
        }
    }
}

/// Sends the settle event for its action when dropped, so the spinner that
/// went up at dispatch comes back down on every exit path of the update
/// task, panics included.
struct SettleGuard {
    action: ActionKey,
    ui_tx: Sender<UiEvent>,
}

impl Drop for SettleGuard {
    fn drop(&mut self) {
        let _ = self.ui_tx.try_send(UiEvent::ActionSettled {
            action: self.action,
        });
    }
}

pub fn start_backend_bridge(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::BackendFailed(UiError::new(
                    UiErrorContext::BackendStartup,
                    format!("failed to build backend runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let mut client: Option<Arc<HttpShelfClient>> = None;
            let art_http = reqwest::Client::new();

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::Configure {
                        server_url,
                        csrf_cookie,
                        update_timeout,
                    } => {
                        tracing::info!(%server_url, "backend: configure");
                        let _ = ui_tx.try_send(UiEvent::Info(format!("Using server {server_url}")));
                        client = Some(Arc::new(HttpShelfClient::with_settings(
                            server_url,
                            csrf_cookie,
                            update_timeout,
                        )));
                    }
                    BackendCommand::LoadShelf { source } => {
                        let Some(client) = client.as_ref() else {
                            let _ = ui_tx.try_send(UiEvent::ShelfLoadFailed(UiError::new(
                                UiErrorContext::LoadShelf,
                                "no server configured",
                            )));
                            continue;
                        };
                        let _ = ui_tx.try_send(UiEvent::ShelfLoading);
                        tracing::info!(%source, "backend: load_shelf");
                        match client.fetch_shelf(&source).await {
                            Ok(shelf) => {
                                let _ = ui_tx.try_send(UiEvent::ShelfLoaded(shelf));
                            }
                            Err(err) => {
                                tracing::error!("backend: load_shelf failed: {err}");
                                let _ = ui_tx.try_send(UiEvent::ShelfLoadFailed(UiError::new(
                                    UiErrorContext::LoadShelf,
                                    err.to_string(),
                                )));
                            }
                        }
                    }
                    BackendCommand::ApplyUpdate { action, request } => {
                        let Some(client) = client.as_ref() else {
                            let _ = ui_tx.try_send(UiEvent::UpdateFailed {
                                action,
                                error: UiError::new(
                                    UiErrorContext::ApplyUpdate,
                                    "no server configured",
                                ),
                            });
                            let _ = ui_tx.try_send(UiEvent::ActionSettled { action });
                            continue;
                        };
                        let client = Arc::clone(client);
                        let ui_tx = ui_tx.clone();
                        tokio::spawn(async move {
                            let _settle = SettleGuard {
                                action,
                                ui_tx: ui_tx.clone(),
                            };
                            match client.apply_update(request).await {
                                Ok(update) => {
                                    let _ = ui_tx.try_send(UiEvent::UpdateApplied { action, update });
                                }
                                Err(err) => {
                                    tracing::error!("backend: apply_update failed: {err}");
                                    let _ = ui_tx.try_send(UiEvent::UpdateFailed {
                                        action,
                                        error: UiError::new(
                                            UiErrorContext::ApplyUpdate,
                                            err.to_string(),
                                        ),
                                    });
                                }
                            }
                        });
                    }
                    BackendCommand::FetchPoster {
                        generation,
                        card,
                        url,
                    } => {
                        let art_http = art_http.clone();
                        let ui_tx = ui_tx.clone();
                        tokio::spawn(async move {
                            match fetch_poster_image(&art_http, url).await {
                                Ok(image) => {
                                    let _ = ui_tx.try_send(UiEvent::PosterLoaded {
                                        generation,
                                        card,
                                        image,
                                    });
                                }
                                Err(reason) => {
                                    tracing::warn!(card, "poster fetch failed: {reason}");
                                    let _ = ui_tx.try_send(UiEvent::PosterFailed {
                                        generation,
                                        card,
                                        reason,
                                    });
                                }
                            }
                        });
                    }
                }
            }
        });
    });
}

async fn fetch_poster_image(http: &reqwest::Client, url: Url) -> Result<PosterImage, String> {
    let response = http
        .get(url)
        .send()
        .await
        .map_err(|err| format!("fetch failed: {err}"))?;
    let status = response.status();
    if !status.is_success() {
        return Err(format!(
            "{}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("unknown status")
        ));
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|err| format!("read failed: {err}"))?;
    decode_poster_image(&bytes)
}

fn decode_poster_image(bytes: &[u8]) -> Result<PosterImage, String> {
    let decoded = image::load_from_memory(bytes).map_err(|err| err.to_string())?;
    let (orig_w, orig_h) = decoded.dimensions();
    let scale = (POSTER_MAX_DECODE_DIMENSION / orig_w.max(orig_h) as f32).min(1.0);
    let resized = if scale < 1.0 {
        decoded.resize(
            (orig_w as f32 * scale).max(1.0) as u32,
            (orig_h as f32 * scale).max(1.0) as u32,
            image::imageops::FilterType::Triangle,
        )
    } else {
        decoded
    };
    let rgba = resized.to_rgba8();
    let width = rgba.width() as usize;
    let height = rgba.height() as usize;
    Ok(PosterImage {
        width,
        height,
        rgba: rgba.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(image)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn small_poster_decodes_at_full_size() {
        let image = decode_poster_image(&png_bytes(8, 4)).unwrap();
        assert_eq!((image.width, image.height), (8, 4));
        assert_eq!(image.rgba.len(), 8 * 4 * 4);
    }

    #[test]
    fn oversized_poster_is_downscaled_preserving_aspect() {
        let image = decode_poster_image(&png_bytes(1200, 600)).unwrap();
        assert_eq!((image.width, image.height), (480, 240));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(decode_poster_image(b"definitely not an image").is_err());
    }

    #[test]
    fn settle_guard_fires_on_drop() {
        let (ui_tx, ui_rx) = crossbeam_channel::bounded(4);
        let action = ActionKey {
            generation: 1,
            card: 3,
            source: ActionSource::Manual,
        };
        drop(SettleGuard { action, ui_tx });
        match ui_rx.try_recv() {
            Ok(UiEvent::ActionSettled { action: settled }) => assert_eq!(settled, action),
            _ => panic!("expected the settle event"),
        }
    }
}
