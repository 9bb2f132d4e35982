use indicatif::{ProgressBar, ProgressStyle};

pub const MASTER_PREFIX: &str = "Master";
pub const SLAVE_PREFIX: &str = "Slave";

pub fn create_bpm_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    style_bpm_spinner(&pb);
    pb
}

pub fn style_bpm_spinner(pb: &ProgressBar) {
    let style = ProgressStyle::default_spinner()
        .template("{prefix:.bold.dim} {spinner} {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_prefix(MASTER_PREFIX);
    pb.set_message("waiting for clock");
}
