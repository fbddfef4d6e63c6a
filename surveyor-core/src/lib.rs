pub mod config;
pub mod crawl;
pub mod report;

use colored::Colorize;

pub fn print_banner() {
    println!(
        "{}",
        r#"
 ___ _   _ _ ____   _____ _   _  ___  _ __
/ __| | | | '__\ \ / / _ \ | | |/ _ \| '__|
\__ \ |_| | |   \ V /  __/ |_| | (_) | |
|___/\__,_|_|    \_/ \___|\__, |\___/|_|
                          |___/"#
            .cyan()
    );
    println!(
        "  {} {}\n",
        "web application surface scanner".dimmed(),
        env!("CARGO_PKG_VERSION").dimmed()
    );
}
