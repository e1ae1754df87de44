use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let page = || clap::arg!(--page <N> "Origin page number").default_value("1");

    let mut cmd = clap::Command::new("mangarelay")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Browse manga listings, details and chapter images")
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds").global(true).default_value("30"))
        .arg(clap::arg!(--"user-agent" <UA> "Custom User-Agent for HTTP requests").global(true))
        .arg(clap::arg!(--"updates-url" <URL> "Listing page URL; search pages are resolved against it").global(true))
        .arg(clap::arg!(--"chapter-base" <URL> "Detail base for cu- ids").global(true))
        .arg(clap::arg!(--"manga-base" <URL> "Detail base for mu- ids").global(true))
        .arg(clap::arg!(-v --verbose "Enable step-by-step progress on stderr").global(true))
        .subcommand(clap::Command::new("updates").about("List recently updated manga").arg(page()))
        .subcommand(
            clap::Command::new("search")
                .about("Search manga by title")
                .arg(clap::arg!(<QUERY> "Title to search for"))
                .arg(page()),
        )
        .subcommand(
            clap::Command::new("info")
                .about("Show details and chapters of one manga")
                .arg(clap::arg!(<MANGA> "Manga id such as mu-manga-ab1234")),
        )
        .subcommand(
            clap::Command::new("chapter")
                .about("List the page images of a chapter")
                .arg(clap::arg!(<TOKEN> "Chapter token")),
        )
        .subcommand(
            clap::Command::new("image")
                .about("Download one image")
                .arg(clap::arg!(<TOKEN> "Image token"))
                .arg(
                    clap::arg!(-o --output <FILE> "Output file (default: the image's own filename)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                ),
        )
        .subcommand(
            clap::Command::new("encode")
                .about("Turn an origin URL into a token")
                .arg(clap::arg!(<URL> "Origin URL")),
        )
        .subcommand(
            clap::Command::new("decode")
                .about("Turn a token back into its origin URL")
                .arg(clap::arg!(<TOKEN> "Token")),
        )
        .subcommand(
            clap::Command::new("completions")
                .about("Generate a shell completion script")
                .arg(clap::arg!(<SHELL> "Target shell").value_parser(["bash", "zsh", "fish", "powershell", "elvish"])),
        );

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "mangarelay", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "mangarelay", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "mangarelay", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "mangarelay", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
