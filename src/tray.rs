//! `tray-icon` rendering of the menu (macOS).

use std::path::Path;

use tray_icon::menu::{self, Menu, MenuItem, PredefinedMenuItem, Submenu};
use tray_icon::{Icon, TrayIcon, TrayIconBuilder};

use crate::menu::{EntryView, Group, MenuSurface, TrayStatus};

pub const REFRESH_ID: &str = "refresh";
pub const QUIT_ID: &str = "quit";

/// Standard macOS menu bar icon size
const ICON_SIZE: u32 = 22;

struct Rgba {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

/// Status bar menu: "Recent" and "Active" submenus plus static Refresh/Quit.
pub struct TrayMenu {
    menu: Menu,
    recent: Submenu,
    active: Submenu,
    recent_items: Vec<MenuItem>,
    active_items: Vec<MenuItem>,
    tray: Option<TrayIcon>,
    custom_icon: Option<Rgba>,
}

impl TrayMenu {
    pub fn new(icon_path: Option<&Path>) -> Result<Self, menu::Error> {
        let recent = Submenu::new("Recent", false);
        let active = Submenu::new("Active", false);
        let refresh = MenuItem::with_id(REFRESH_ID, "Refresh", true, None);
        let quit = MenuItem::with_id(QUIT_ID, "Quit", true, None);

        let menu = Menu::new();
        menu.append_items(&[
            &recent,
            &PredefinedMenuItem::separator(),
            &active,
            &PredefinedMenuItem::separator(),
            &refresh,
            &PredefinedMenuItem::separator(),
            &quit,
        ])?;

        let custom_icon = icon_path.and_then(|path| match load_icon(path) {
            Ok(rgba) => Some(rgba),
            Err(e) => {
                log::warn!("ignoring icon {}: {e}", path.display());
                None
            }
        });

        Ok(Self {
            menu,
            recent,
            active,
            recent_items: Vec::new(),
            active_items: Vec::new(),
            tray: None,
            custom_icon,
        })
    }

    /// Create the status item. Must run once the event loop has started.
    pub fn show(&mut self) -> Result<(), tray_icon::Error> {
        let mut builder = TrayIconBuilder::new()
            .with_menu(Box::new(self.menu.clone()))
            .with_tooltip("Kimai");
        if let Some(icon) = self.icon(false) {
            builder = builder.with_icon(icon);
        }
        self.tray = Some(builder.build()?);
        Ok(())
    }

    /// Drop the status item so it disappears before the process exits.
    pub fn hide(&mut self) {
        self.tray.take();
    }

    fn icon(&self, running: bool) -> Option<Icon> {
        let rgba = match &self.custom_icon {
            Some(custom) => Rgba {
                pixels: custom.pixels.clone(),
                width: custom.width,
                height: custom.height,
            },
            None => draw_icon(running),
        };
        Icon::from_rgba(rgba.pixels, rgba.width, rgba.height)
            .map_err(|e| log::warn!("bad tray icon: {e}"))
            .ok()
    }

    fn group(&mut self, group: Group) -> (&Submenu, &mut Vec<MenuItem>) {
        match group {
            Group::Recent => (&self.recent, &mut self.recent_items),
            Group::Active => (&self.active, &mut self.active_items),
        }
    }
}

impl MenuSurface for TrayMenu {
    fn replace_entries(&mut self, group: Group, entries: &[EntryView]) {
        let (submenu, items) = self.group(group);
        for item in items.drain(..) {
            if let Err(e) = submenu.remove(&item) {
                log::warn!("failed to remove {:?} entry: {e}", group);
            }
        }
        for view in entries {
            let item = MenuItem::with_id(view.id.as_str(), &view.label, view.clickable, None);
            match submenu.append(&item) {
                Ok(()) => items.push(item),
                Err(e) => log::warn!("failed to add entry {:?}: {e}", view.label),
            }
        }
    }

    fn set_group_enabled(&mut self, group: Group, enabled: bool) {
        let (submenu, _) = self.group(group);
        submenu.set_enabled(enabled);
    }

    fn set_label(&mut self, entry_id: &str, label: &str) {
        let item = self
            .recent_items
            .iter()
            .chain(self.active_items.iter())
            .find(|item| item.id().0 == entry_id);
        match item {
            Some(item) => item.set_text(label),
            None => log::debug!("no entry {entry_id} to relabel"),
        }
    }

    fn show_status(&mut self, status: &TrayStatus) {
        let icon = self.icon(status.running);
        if let Some(tray) = &self.tray {
            let _ = tray.set_tooltip(Some(&status.tooltip));
            if icon.is_some() {
                let _ = tray.set_icon(icon);
            }
        }
    }
}

fn load_icon(path: &Path) -> Result<Rgba, image::ImageError> {
    let image = image::open(path)?
        .resize(ICON_SIZE, ICON_SIZE, image::imageops::FilterType::Lanczos3)
        .into_rgba8();
    let (width, height) = image.dimensions();
    Ok(Rgba {
        pixels: image.into_raw(),
        width,
        height,
    })
}

/// Ring icon: white with a filled center while a task runs, gray when idle.
fn draw_icon(running: bool) -> Rgba {
    let size = ICON_SIZE;
    let mut pixels = vec![0u8; (size * size * 4) as usize];

    let center = size as f32 / 2.0;
    let outer_radius = size as f32 / 2.0 - 1.0;
    let inner_radius = outer_radius - 3.5;
    let shade = if running { 255 } else { 128 };

    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 - center + 0.5;
            let dy = y as f32 - center + 0.5;
            let dist = (dx * dx + dy * dy).sqrt();
            let idx = ((y * size + x) * 4) as usize;

            let on_ring = dist <= outer_radius && dist >= inner_radius;
            let on_dot = if running { dist <= inner_radius - 2.0 } else { dist <= 3.0 };
            if on_ring || on_dot {
                pixels[idx] = shade;
                pixels[idx + 1] = shade;
                pixels[idx + 2] = shade;
                pixels[idx + 3] = 255;
            }
        }
    }

    Rgba {
        pixels,
        width: size,
        height: size,
    }
}
