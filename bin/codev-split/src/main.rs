use codev_split::archive::{
    add_minecraft_marker, is_codev_generated_minecraft_jar, CompressionMethod,
};
use codev_split::split::{self, ClassMappings, Settings, SplitReport};

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::process;

fn main() -> Result<(), split::Error> {
    env_logger::init();

    let matches = Command::new("Minecraft jar splitter")
        .version("0.1.0")
        .about("Split Minecraft client and server jars into common and client-only jars")
        .subcommand_required(true)
        .arg(
            Arg::new("client-annotation")
                .long("client-annotation")
                .value_name("DESCRIPTOR")
                .global(true)
                .help("Annotation for members and classes that only exist on the client"),
        )
        .arg(
            Arg::new("server-annotation")
                .long("server-annotation")
                .value_name("DESCRIPTOR")
                .global(true)
                .help("Annotation for members and classes that only exist on the server"),
        )
        .arg(
            Arg::new("side-annotation")
                .long("side-annotation")
                .value_name("DESCRIPTOR")
                .action(ArgAction::Append)
                .global(true)
                .help("Annotation whose CLIENT value marks a member client-only (repeatable)"),
        )
        .arg(
            Arg::new("client-name-hint")
                .long("client-name-hint")
                .value_name("TEXT")
                .global(true)
                .help("Non-vanilla classes whose path contains this are client-only"),
        )
        .arg(
            Arg::new("marker")
                .long("marker-attribute")
                .value_name("ATTRIBUTE")
                .global(true)
                .help("Manifest attribute stamped into produced jars"),
        )
        .arg(
            Arg::new("compression")
                .long("compression")
                .value_name("METHOD")
                .value_parser(["deflated", "stored"])
                .global(true)
                .help("Compression of produced jars"),
        )
        .subcommand(
            Command::new("legacy")
                .about("Split a client jar and a server jar")
                .args(client_and_server())
                .args(outputs()),
        )
        .subcommand(
            Command::new("merged")
                .about("Split a jar with client and server code merged together")
                .arg(
                    Arg::new("MERGED")
                        .help("Merged jar to split")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .index(1),
                )
                .args(client_and_server())
                .args(outputs())
                .arg(
                    Arg::new("mappings")
                        .long("mappings")
                        .value_name("FILE")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Class mappings from merged jar names to vanilla names"),
                )
                .arg(
                    Arg::new("reverse")
                        .long("reverse-mappings")
                        .action(ArgAction::SetTrue)
                        .help("The mapping file maps vanilla names to merged jar names"),
                ),
        )
        .subcommand(
            Command::new("bundled")
                .about("Extract the client-only part of a client jar containing the server")
                .args(client_and_server())
                .arg(path_arg("client-out", "Client-only output jar")),
        )
        .subcommand(
            Command::new("marker")
                .about("Inspect or add the marker of produced jars")
                .subcommand_required(true)
                .subcommand(
                    Command::new("check")
                        .about("Exit with status 1 if the jar is not marked")
                        .arg(jar_arg()),
                )
                .subcommand(Command::new("add").about("Mark a jar").arg(jar_arg())),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("legacy", sub)) => {
            let report = split::split_legacy(
                path(sub, "client"),
                path(sub, "server"),
                path(sub, "common-out"),
                path(sub, "client-out"),
                &settings(sub),
            )?;
            print_report(&report);
        }
        Some(("merged", sub)) => {
            let mut mappings = ClassMappings::load(path(sub, "mappings"))?;
            if sub.get_flag("reverse") {
                mappings = mappings.reversed();
            }
            let report = split::split_merged(
                path(sub, "MERGED"),
                path(sub, "client"),
                path(sub, "server"),
                path(sub, "common-out"),
                path(sub, "client-out"),
                &mappings,
                &settings(sub),
            )?;
            print_report(&report);
        }
        Some(("bundled", sub)) => {
            let output = split::split_bundled_client(
                path(sub, "client"),
                path(sub, "server"),
                path(sub, "client-out"),
                &settings(sub),
            )?;
            println!("client: {}", output.display());
        }
        Some(("marker", sub)) => match sub.subcommand() {
            Some(("check", jar)) => {
                let marked = is_codev_generated_minecraft_jar(path(jar, "JAR"))?;
                println!("{}", marked);
                if !marked {
                    process::exit(1);
                }
            }
            Some(("add", jar)) => {
                let jar = path(jar, "JAR");
                add_minecraft_marker(&jar)?;
                log::info!("Marked {}", jar.display());
            }
            _ => unreachable!("subcommand is required"),
        },
        _ => unreachable!("subcommand is required"),
    }

    Ok(())
}

fn path_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_name("JAR")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help(help)
}

fn jar_arg() -> Arg {
    Arg::new("JAR")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .index(1)
}

fn client_and_server() -> [Arg; 2] {
    [
        path_arg("client", "Vanilla client jar"),
        path_arg("server", "Vanilla server jar"),
    ]
}

fn outputs() -> [Arg; 2] {
    [
        path_arg("common-out", "Common output jar"),
        path_arg("client-out", "Client-only output jar"),
    ]
}

/// Required path arguments are always present once parsing succeeds
fn path(matches: &ArgMatches, name: &str) -> PathBuf {
    matches
        .get_one::<PathBuf>(name)
        .cloned()
        .unwrap_or_default()
}

fn settings(matches: &ArgMatches) -> Settings {
    let mut settings = Settings::default();
    if let Some(annotation) = matches.get_one::<String>("client-annotation") {
        settings.client_exclusive_annotation = annotation.clone();
    }
    if let Some(annotation) = matches.get_one::<String>("server-annotation") {
        settings.server_exclusive_annotation = annotation.clone();
    }
    if let Some(annotations) = matches.get_many::<String>("side-annotation") {
        settings.side_only_annotations = annotations.cloned().collect();
    }
    if let Some(hint) = matches.get_one::<String>("client-name-hint") {
        settings.client_name_hint = hint.clone();
    }
    if let Some(marker) = matches.get_one::<String>("marker") {
        settings.marker_attribute = marker.clone();
    }
    if let Some(method) = matches.get_one::<String>("compression") {
        settings.compression = match method.as_str() {
            "stored" => CompressionMethod::Stored,
            _ => CompressionMethod::Deflated,
        };
    }
    log::debug!("{:?}", settings);
    settings
}

fn print_report(report: &SplitReport) {
    println!(
        "common: {} ({} classes)",
        report.common.display(),
        report.common_classes
    );
    println!(
        "client: {} ({} classes)",
        report.client.display(),
        report.client_classes
    );
    for name in &report.closure {
        println!("copied to common: {}", name);
    }
    for inconsistency in &report.inconsistencies {
        println!("inconsistent: {}", inconsistency);
    }
}
