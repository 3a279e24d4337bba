//! Drive enumeration
//!
//! Lists the storage volumes visible to the host. Each call re-queries the
//! operating system.

use log::{debug, info};
use sysinfo::{Disk, DiskKind, Disks};

use crate::storage::results::DriveInfoModel;

/// Lists ready volumes, ordered by name.
///
/// Volumes that report no capacity (an empty optical drive, a disconnected
/// mapping) are not ready and are left out rather than reported as errors.
pub fn list_drives() -> Vec<DriveInfoModel> {
    let disks = Disks::new_with_refreshed_list();

    let mut drives: Vec<DriveInfoModel> = disks
        .list()
        .iter()
        .filter(|disk| {
            let ready = disk.total_space() > 0;
            if !ready {
                debug!("Skipping volume {} (not ready)", disk.mount_point().display());
            }
            ready
        })
        .map(drive_info)
        .collect();

    drives.sort_by(|a, b| a.name.cmp(&b.name));
    drives.dedup_by(|a, b| a.name == b.name);

    info!("Listed {} drives", drives.len());
    drives
}

fn drive_info(disk: &Disk) -> DriveInfoModel {
    DriveInfoModel {
        name: disk.mount_point().to_string_lossy().into_owned(),
        volume_label: disk.name().to_string_lossy().into_owned(),
        drive_type: drive_type(disk).to_string(),
        drive_format: disk.file_system().to_string_lossy().into_owned(),
        total_size: disk.total_space(),
        available_free_space: disk.available_space(),
        is_ready: true,
    }
}

fn drive_type(disk: &Disk) -> &'static str {
    if disk.is_removable() {
        return "Removable";
    }
    match disk.kind() {
        DiskKind::SSD | DiskKind::HDD => "Fixed",
        DiskKind::Unknown(_) => "Unknown",
    }
}
