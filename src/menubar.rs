//! Status bar applet mirroring the running Kimai timesheet.

#[cfg(target_os = "macos")]
fn main() {
    if let Err(e) = applet::run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

#[cfg(not(target_os = "macos"))]
fn main() {
    eprintln!("kimai-tray only supports macOS; use the `kimai` CLI instead");
    std::process::exit(1);
}

#[cfg(target_os = "macos")]
mod applet {
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use anyhow::{Context, Result};
    use clap::Parser;
    use objc2::MainThreadMarker;
    use objc2_app_kit::{NSApplication, NSApplicationActivationPolicy};
    use tao::{
        event::{Event, StartCause},
        event_loop::{ControlFlow, EventLoopBuilder},
    };
    use tray_icon::menu::MenuEvent;

    use kimai_tray::tray::{QUIT_ID, REFRESH_ID, TrayMenu};
    use kimai_tray::{Config, Dispatcher, HttpClient, MenuEngine, MenuState, Synchronizer};

    #[derive(Parser)]
    #[command(name = "kimai-tray")]
    #[command(about = "Kimai timesheets in the menu bar", long_about = None)]
    struct Args {
        /// Stay attached to the terminal (useful for debugging)
        #[arg(long)]
        no_fork: bool,

        /// Config file to use instead of the default location
        #[arg(short, long, env = "KIMAI_TRAY_CONFIG")]
        config: Option<PathBuf>,
    }

    /// How often the active task's elapsed time is re-rendered
    const CLOCK_INTERVAL: Duration = Duration::from_secs(15);

    enum UserEvent {
        Menu(MenuEvent),
        Synced(MenuState),
        /// Local redraw of the elapsed time, no remote call
        Clock,
        /// Configured remote refresh
        Tick,
    }

    /// Hide the app from the Dock and app switcher (menu bar only)
    fn set_activation_policy_accessory() {
        // Safety: only called from the main thread
        let mtm = unsafe { MainThreadMarker::new_unchecked() };
        let app = NSApplication::sharedApplication(mtm);
        app.setActivationPolicy(NSApplicationActivationPolicy::Accessory);
    }

    /// Fork and detach from the terminal
    fn daemonize() -> Result<()> {
        unsafe {
            let pid = libc::fork();
            if pid < 0 {
                anyhow::bail!("Failed to fork");
            }
            if pid > 0 {
                println!("kimai-tray started (pid: {})", pid);
                std::process::exit(0);
            }
            libc::setsid();
        }
        Ok(())
    }

    pub fn run() -> Result<()> {
        let args = Args::parse();

        // Config problems are reported before detaching.
        let config = Config::load(args.config.as_deref()).context("Failed to load config")?;

        if !args.no_fork {
            daemonize()?;
        }
        kimai_tray::logging::init();

        // The blocking client owns a runtime thread, so it is built after forking.
        let client = HttpClient::new(&config).context("Failed to create API client")?;

        // Must be set before the event loop is created
        set_activation_policy_accessory();

        let event_loop = EventLoopBuilder::<UserEvent>::with_user_event().build();

        // tao may reset it
        set_activation_policy_accessory();

        let proxy = event_loop.create_proxy();
        MenuEvent::set_event_handler(Some(move |event| {
            let _ = proxy.send_event(UserEvent::Menu(event));
        }));

        let proxy = event_loop.create_proxy();
        let publish = move |state: MenuState| {
            let _ = proxy.send_event(UserEvent::Synced(state));
        };
        let sync = Arc::new(Synchronizer::new(Arc::new(client)));
        let dispatcher = Dispatcher::new(sync, Arc::new(publish));

        let proxy = event_loop.create_proxy();
        thread::spawn(move || {
            loop {
                thread::sleep(CLOCK_INTERVAL);
                if proxy.send_event(UserEvent::Clock).is_err() {
                    break;
                }
            }
        });

        if let Some(interval) = config.refresh_interval() {
            let proxy = event_loop.create_proxy();
            thread::spawn(move || {
                loop {
                    thread::sleep(interval);
                    if proxy.send_event(UserEvent::Tick).is_err() {
                        break;
                    }
                }
            });
        }

        let mut tray_menu =
            TrayMenu::new(config.icon.as_deref()).context("Failed to build tray menu")?;
        let mut engine = MenuEngine::new();

        // Remote calls block, so each one gets its own worker thread.
        let refresh = {
            let dispatcher = dispatcher.clone();
            move || {
                let dispatcher = dispatcher.clone();
                thread::spawn(move || {
                    dispatcher.refresh();
                });
            }
        };

        event_loop.run(move |event, _, control_flow| {
            *control_flow = ControlFlow::Wait;

            match event {
                Event::NewEvents(StartCause::Init) => {
                    // tao sets the policy to Regular on startup
                    set_activation_policy_accessory();

                    if let Err(e) = tray_menu.show() {
                        log::error!("failed to create status item: {e}");
                        *control_flow = ControlFlow::Exit;
                        return;
                    }
                    engine.rebuild(&MenuState::default(), &mut tray_menu);
                    refresh();

                    // Wake up the run loop on macOS
                    use objc2_core_foundation::CFRunLoop;
                    if let Some(run_loop) = CFRunLoop::main() {
                        run_loop.wake_up();
                    }
                }

                Event::UserEvent(UserEvent::Synced(state)) => {
                    engine.rebuild(&state, &mut tray_menu);
                }

                Event::UserEvent(UserEvent::Clock) => {
                    engine.refresh_elapsed(&mut tray_menu);
                }

                Event::UserEvent(UserEvent::Tick) => refresh(),

                Event::UserEvent(UserEvent::Menu(event)) => {
                    let id = event.id.0.as_str();

                    if id == QUIT_ID {
                        tray_menu.hide();
                        *control_flow = ControlFlow::Exit;
                    } else if id == REFRESH_ID {
                        refresh();
                    } else if let Some(action) = engine.resolve(id) {
                        log::info!("clicked {action}");
                        let dispatcher = dispatcher.clone();
                        thread::spawn(move || {
                            dispatcher.dispatch(action);
                        });
                    } else {
                        log::debug!("ignoring click on retired entry {id}");
                    }
                }

                _ => {}
            }
        })
    }
}
