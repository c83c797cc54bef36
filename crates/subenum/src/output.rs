use crate::model::OpenPortRecord;
use colored::Colorize;
use std::time::Duration;

// region:        --- Sink

#[derive(Debug, Clone, Default)]
pub struct Summary {
    pub total: usize,
    pub search_count: usize,
    pub bruteforce_count: usize,
    pub bruteforce_enabled: bool,
    pub engine_names: Vec<String>,
    pub elapsed: Duration,
}

/// Presentation side channel. Nothing here feeds back into enumeration.
pub trait OutputSink: Send + Sync {
    fn discovery(&self, source: &str, host: &str);
    fn progress(&self, completed: usize, total: usize);
    fn error(&self, source: &str, message: &str);
    fn results(&self, hosts: &[String]);
    fn open_ports(&self, record: &OpenPortRecord);
    fn summary(&self, summary: &Summary);
}

// endregion:     --- Sink

// region:        --- Console

pub struct ConsoleSink {
    verbose: bool,
}

impl ConsoleSink {
    pub fn new(verbose: bool, color: bool) -> Self {
        if !color {
            colored::control::set_override(false);
        }
        Self { verbose }
    }
}

impl OutputSink for ConsoleSink {
    fn discovery(&self, source: &str, host: &str) {
        if self.verbose {
            println!("{}: {}", source.cyan(), host.green());
        }
    }

    fn progress(&self, completed: usize, total: usize) {
        eprintln!("{} {}/{} engines done", "[~]".blue(), completed, total);
    }

    fn error(&self, source: &str, message: &str) {
        eprintln!("{} {}: {}", "[!]".red(), source, message);
    }

    fn results(&self, hosts: &[String]) {
        println!(
            "{}",
            format!("[-] Total Unique Subdomains Found: {}", hosts.len()).yellow()
        );
        for host in hosts {
            println!("{}", host.green());
        }
    }

    fn open_ports(&self, record: &OpenPortRecord) {
        let ports: Vec<String> = record.ports.iter().map(u16::to_string).collect();
        println!(
            "{} - {} {}",
            record.host.green(),
            "Found open ports:".red(),
            ports.join(", ").magenta()
        );
    }

    fn summary(&self, summary: &Summary) {
        if !self.verbose {
            return;
        }
        for line in summary_lines(summary) {
            println!("{}", line);
        }
    }
}

fn summary_lines(summary: &Summary) -> Vec<String> {
    let rule = "=".repeat(60);
    let mut lines = vec![
        rule.magenta().to_string(),
        "Enumeration Summary".bold().magenta().to_string(),
        rule.magenta().to_string(),
        format!("Total Subdomains Found: {}", summary.total),
        format!("Engines Used: {}", summary.engine_names.len()),
        format!("Scan Time: {}", format_elapsed(summary.elapsed)),
        String::new(),
        "Breakdown by Source:".to_string(),
        format!("  - Search Engines: {}", count_label(summary.search_count)),
    ];
    if summary.bruteforce_enabled {
        lines.push(format!(
            "  - Bruteforce: {}",
            count_label(summary.bruteforce_count)
        ));
    }
    lines.push(String::new());

    let mut names = summary.engine_names.clone();
    names.sort();
    if names.is_empty() {
        lines.push("Engines: None".to_string());
    } else {
        lines.push(format!("Engines: {}", names.join(", ")));
    }
    lines.push(rule.magenta().to_string());
    lines
}

// endregion:     --- Console

// region:        --- Formatting

fn plural(count: u64, unit: &str) -> String {
    if count == 1 {
        format!("{} {}", count, unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

fn count_label(count: usize) -> String {
    plural(count as u64, "subdomain")
}

pub fn format_elapsed(elapsed: Duration) -> String {
    let seconds = elapsed.as_secs_f64();
    if seconds < 1.0 {
        return format!("{:.2} seconds", seconds);
    }

    let rounded = seconds.round() as u64;
    if seconds < 60.0 {
        return format!("{} seconds", rounded);
    }

    let hours = rounded / 3600;
    let minutes = (rounded % 3600) / 60;
    let secs = rounded % 60;
    if hours == 0 {
        format!("{} {}", plural(minutes, "minute"), plural(secs, "second"))
    } else {
        format!(
            "{} {} {}",
            plural(hours, "hour"),
            plural(minutes, "minute"),
            plural(secs, "second")
        )
    }
}

// endregion:     --- Formatting

// region:        --- Tests


// endregion:     --- Tests
