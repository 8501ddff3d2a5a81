use std::{path::PathBuf, sync::mpsc::Sender, thread, time::Duration};

use crate::{disk::geometry::Geometry, fs::FileSystem, shell::BootProgress};

/// Prepares the backing image on a worker thread, reporting progress back
/// to the shell. A missing image is created and formatted; an existing one
/// is mount-checked (exact size, readable root table).
pub fn perform_disk_initialization(tx: Sender<BootProgress>, image: PathBuf, geometry: Geometry) {
    tx.send(BootProgress::Step("Probing disk image...")).unwrap();

    let fresh = !image.exists();
    let fs = FileSystem::new(image, geometry);

    if fresh {
        tx.send(BootProgress::Step("No image found, formatting a new file system..."))
            .unwrap();

        if let Err(e) = fs.format() {
            tx.send(BootProgress::Finished(Err(Box::new(e)))).unwrap();
            return;
        }

        for i in 0..=50 {
            tx.send(BootProgress::Progress(i)).unwrap();
            thread::sleep(Duration::from_millis(5));
        }
    } else {
        tx.send(BootProgress::Progress(50)).unwrap();
    }

    tx.send(BootProgress::Step("Mounting file system...")).unwrap();

    // Existing or fresh, the image must validate before the shell gets it.
    if let Err(e) = fs.mount() {
        tx.send(BootProgress::Finished(Err(Box::new(e)))).unwrap();
        return;
    }

    for i in 50..=100 {
        tx.send(BootProgress::Progress(i)).unwrap();
        thread::sleep(Duration::from_millis(5));
    }

    tx.send(BootProgress::Finished(Ok(fs))).unwrap();
}
