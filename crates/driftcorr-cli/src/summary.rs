use std::path::Path;

use console::Style;
use driftcorr_core::io::NhdrReport;
use driftcorr_core::pipeline::{DriftCorrection, RegistrationConfig, SmoothingConfig};

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    warn: Style,
    error: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            warn: Style::new().yellow(),
            error: Style::new().red().bold(),
            path: Style::new().underlined(),
        }
    }
}

fn rule(len: usize) -> String {
    "\u{2550}".repeat(len)
}

pub fn print_registration_summary(dir: &Path, frames: usize, config: &RegistrationConfig) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Drift Registration"));
    println!("  {}", s.title.apply_to(rule(18)));
    println!();
    println!(
        "  {:<14}{}",
        s.label.apply_to("Directory"),
        s.path.apply_to(dir.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Frames"),
        s.value.apply_to(frames)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Bound"),
        s.value.apply_to(format!("{} px", config.offset_bound))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Kernels"),
        s.method.apply_to(format!("{} {}", config.kernel, config.derivative))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Epsilon"),
        s.value.apply_to(config.epsilon)
    );
    println!();
}

pub fn print_registration_failures(failures: &[(usize, String)]) {
    if failures.is_empty() {
        return;
    }
    let s = Styles::new();
    println!(
        "  {}",
        s.error
            .apply_to(format!("{} pair(s) failed", failures.len()))
    );
    for (frame, reason) in failures {
        println!("    {:<6}{}", s.label.apply_to(frame), s.warn.apply_to(reason));
    }
    println!();
}

pub fn print_correction_summary(
    correction: &DriftCorrection,
    report: &NhdrReport,
    smoothing: &SmoothingConfig,
) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Drift Correction"));
    println!("  {}", s.title.apply_to(rule(16)));
    println!();
    println!(
        "  {:<14}{}",
        s.label.apply_to("Frames"),
        s.value.apply_to(correction.frame_count())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Smoothing"),
        s.method.apply_to(smoothing)
    );
    if correction.missing.is_empty() {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Missing"),
            s.method.apply_to("none")
        );
    } else {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Missing"),
            s.warn.apply_to(format!("{:?}", correction.missing))
        );
    }
    println!();

    let last = correction.raw.last();
    let smoothed = correction.smoothed.last();
    println!("  {}", s.header.apply_to("Final offset"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Raw"),
        s.value
            .apply_to(format!("{:.3} {:.3} {:.3}", last.dx, last.dy, last.dz))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Smoothed"),
        s.value.apply_to(format!(
            "{:.3} {:.3} {:.3}",
            smoothed.dx, smoothed.dy, smoothed.dz
        ))
    );
    println!();

    println!("  {}", s.header.apply_to("Headers"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Written"),
        s.value.apply_to(report.written.len())
    );
    if !report.skipped.is_empty() {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Skipped"),
            s.warn.apply_to(format!("{:?}", report.skipped))
        );
    }
    println!();
}
