use console::Style;
use framecast_core::encode::EncoderConfig;
use framecast_core::pipeline::{BatchOutput, JobConfig, JobOutput};

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    warning: Style,
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
            warning: Style::new().yellow(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_job_summary(config: &JobConfig) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Framecast"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(9)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Root"),
        s.path.apply_to(config.layout.root.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Source"),
        s.value.apply_to(&config.source)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Movies"),
        s.path.apply_to(config.layout.movie_path().display())
    );
    println!();

    println!("  {}", s.header.apply_to("Normalize"));
    let n = &config.normalize;
    println!("    {:<12}{}", s.label.apply_to("Range"), s.method.apply_to(n.range));
    println!("    {:<12}{}", s.label.apply_to("Colormap"), s.method.apply_to(n.colormap));
    println!("    {:<12}{}", s.label.apply_to("Resize"), s.value.apply_to(n.resize));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Filter"),
        s.method.apply_to(n.interpolation)
    );
    println!();

    println!("  {}", s.header.apply_to("Encode"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Encoder"),
        s.method.apply_to(&config.encoder)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("FPS"),
        s.value.apply_to(config.output.fps)
    );
    if let EncoderConfig::Ffmpeg(ref opts) = config.encoder {
        if let Some(crf) = opts.crf {
            println!("    {:<12}{}", s.label.apply_to("CRF"), s.value.apply_to(crf));
        }
        println!(
            "    {:<12}{}",
            s.label.apply_to("Pixel fmt"),
            s.value.apply_to(&opts.pixel_format)
        );
    }
    println!();
}

pub fn print_job_result(output: &JobOutput) {
    let s = Styles::new();
    let summary = &output.summary;

    println!();
    println!(
        "  {:<14}{}",
        s.label.apply_to("Saved"),
        s.path.apply_to(summary.output.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Frames"),
        s.value.apply_to(format!(
            "{} at {}x{}, {:.2} s",
            summary.frames_written,
            summary.width,
            summary.height,
            summary.duration_secs()
        ))
    );
    for (path, err) in &output.skipped {
        println!(
            "  {:<14}{} ({})",
            s.label.apply_to("Skipped"),
            s.warning.apply_to(path.display()),
            err
        );
    }
}

pub fn print_batch_result(batch: &BatchOutput) {
    let s = Styles::new();

    for output in &batch.completed {
        print_job_result(output);
    }
    println!();
    for (path, err) in &batch.failed {
        println!(
            "  {:<14}{} ({})",
            s.label.apply_to("Failed"),
            s.warning.apply_to(path.display()),
            err
        );
    }
    println!(
        "  {}",
        s.header.apply_to(format!(
            "{} of {} files converted",
            batch.completed.len(),
            batch.total()
        ))
    );
}
