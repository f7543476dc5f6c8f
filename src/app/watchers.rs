use std::path::PathBuf;
use std::sync::mpsc::Sender;

use log::warn;

/// Watch `assets/shaders` under the assets root and nudge the tick loop
/// when any shader source changes. The watcher lives on its own thread;
/// the tick loop drains the channel at the start of each step.
pub(crate) fn spawn_shader_watcher(assets_root: PathBuf, tx: Sender<()>) {
    std::thread::spawn(move || {
        use notify::{EventKind, RecursiveMode, Watcher};
        let dir = assets_root.join("assets/shaders");
        let watcher = notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
            if let Ok(event) = res {
                match event.kind {
                    EventKind::Modify(_) | EventKind::Create(_) | EventKind::Any => {
                        let relevant = event.paths.iter().any(|p| {
                            matches!(
                                p.extension().and_then(|e| e.to_str()),
                                Some("vs") | Some("fs") | Some("glsl")
                            )
                        });
                        if relevant {
                            let _ = tx.send(());
                        }
                    }
                    _ => {}
                }
            }
        });
        match watcher {
            Ok(mut w) => {
                if let Err(e) = w.watch(&dir, RecursiveMode::Recursive) {
                    warn!("shader watch failed on {:?}: {}", dir, e);
                    return;
                }
                // Keep the watcher alive for the lifetime of the process.
                loop {
                    std::thread::park();
                }
            }
            Err(e) => warn!("shader watcher unavailable: {}", e),
        }
    });
}
