use clap::arg;
use url::Url;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("surveyor")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("surveyor")
        .about("Crawl a web application and classify its interactive surface")
        .arg(
            arg!(<URL> "The URL to start crawling from")
                .value_parser(clap::value_parser!(Url)),
        )
        .arg(
            arg!(-p --"max-pages" <N>)
                .required(false)
                .help("Page budget for the crawl")
                .value_parser(clap::value_parser!(usize))
                .default_value("50"),
        )
        .arg(
            arg!(-t --"timeout-ms" <MS>)
                .required(false)
                .help("Per-navigation timeout in milliseconds")
                .value_parser(clap::value_parser!(u64))
                .default_value("30000"),
        )
        .arg(
            arg!(-c --credentials <PATH>)
                .required(false)
                .help("JSON file with login credentials (missing file: crawl without login)")
                .default_value("config.json"),
        )
        .arg(
            arg!(-r --rules <PATH>)
                .required(false)
                .help("JSON file with include/exclude link rules (missing file: no filtering)")
                .default_value("link-rules.json"),
        )
        .arg(
            arg!(-o --output <PATH>)
                .required(false)
                .help("Where to write the site model JSON")
                .default_value("site_analysis.json"),
        )
        .arg(arg!(-q --quiet "Suppress banner and report output").required(false))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_invocation() {
        let matches = command_argument_builder()
            .try_get_matches_from(["surveyor", "https://x.com"])
            .unwrap();
        assert_eq!(
            matches.get_one::<Url>("URL").unwrap().as_str(),
            "https://x.com/"
        );
        assert_eq!(*matches.get_one::<usize>("max-pages").unwrap(), 50);
        assert!(!matches.get_flag("quiet"));
    }

    #[test]
    fn parses_full_invocation() {
        let matches = command_argument_builder()
            .try_get_matches_from([
                "surveyor",
                "https://x.com",
                "--max-pages",
                "5",
                "--timeout-ms",
                "1000",
                "--credentials",
                "~/creds.json",
                "--output",
                "out.json",
                "--quiet",
            ])
            .unwrap();
        assert_eq!(*matches.get_one::<usize>("max-pages").unwrap(), 5);
        assert_eq!(*matches.get_one::<u64>("timeout-ms").unwrap(), 1000);
        assert_eq!(
            matches.get_one::<String>("credentials").unwrap(),
            "~/creds.json"
        );
        assert!(matches.get_flag("quiet"));
    }

    #[test]
    fn rejects_invalid_url() {
        assert!(
            command_argument_builder()
                .try_get_matches_from(["surveyor", "not a url"])
                .is_err()
        );
    }
}
