use std::{
    collections::HashMap,
    env, fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use mldsl::{
    Config, Error, NameOverride, build_api, compile_source, extract_catalog, parse_api_json, parse_dump,
    read_dump_file, render_api_json, validate_api_contract,
};

const USAGE: &str = "\
usage:
  mldsl extract <dump> [-o PATH] [--aliases PATH]
  mldsl build-api <catalog.json> [-o PATH] [--overrides PATH]
  mldsl compile <src.mldsl> --api <api_aliases.json> [--plan PATH] [--print-plan]
";

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    let Some(command) = args.first() else {
        eprint!("{USAGE}");
        return ExitCode::from(2);
    };
    let result = match command.as_str() {
        "extract" => cmd_extract(&args[1..]),
        "build-api" => cmd_build_api(&args[1..]),
        "compile" => cmd_compile(&args[1..]),
        "-h" | "--help" | "help" => {
            print!("{USAGE}");
            Ok(())
        }
        other => {
            eprintln!("error: unknown command `{other}`");
            eprint!("{USAGE}");
            return ExitCode::from(2);
        }
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
    }
}

/// Pulls `flag VALUE` out of an argument list.
fn take_option(args: &mut Vec<String>, flag: &str) -> Result<Option<String>, Error> {
    if let Some(pos) = args.iter().position(|a| a == flag) {
        if pos + 1 >= args.len() {
            return Err(Error::Io(std::io::Error::other(format!("{flag} needs a value"))));
        }
        let value = args.remove(pos + 1);
        args.remove(pos);
        return Ok(Some(value));
    }
    Ok(None)
}

fn take_flag(args: &mut Vec<String>, flag: &str) -> bool {
    if let Some(pos) = args.iter().position(|a| a == flag) {
        args.remove(pos);
        return true;
    }
    false
}

fn read_required(path: &Path) -> Result<String, Error> {
    if !path.exists() {
        return Err(Error::MissingInput(path.to_path_buf()));
    }
    Ok(fs::read_to_string(path)?)
}

fn write_output(path: Option<&str>, content: &str) -> Result<(), Error> {
    match path {
        Some(path) => {
            let path = PathBuf::from(path);
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, content)?;
            println!("OK: wrote {}", path.display());
        }
        None => print!("{content}"),
    }
    Ok(())
}

fn cmd_extract(args: &[String]) -> Result<(), Error> {
    let mut args = args.to_vec();
    let out = take_option(&mut args, "-o")?;
    let aliases_path = take_option(&mut args, "--aliases")?;
    let Some(dump_path) = args.first() else {
        return Err(Error::Io(std::io::Error::other("extract needs a dump path")));
    };

    let sign1_aliases: HashMap<String, String> = match aliases_path {
        Some(path) => {
            let text = read_required(Path::new(&path))?;
            let value: serde_json::Value = serde_json::from_str(&text)?;
            value
                .get("sign1")
                .and_then(|v| serde_json::from_value(v.clone()).ok())
                .unwrap_or_default()
        }
        None => HashMap::new(),
    };

    let text = read_dump_file(Path::new(dump_path))?;
    let (records, diagnostics) = parse_dump(&text);
    let catalog = extract_catalog(&records, &sign1_aliases);
    let mut json = serde_json::to_string_pretty(&catalog)?;
    json.push('\n');
    write_output(out.as_deref(), &json)?;
    println!(
        "records={} skipped_item_lines={} empty_records={}",
        catalog.len(),
        diagnostics.skipped_item_lines,
        diagnostics.empty_records
    );
    Ok(())
}

fn cmd_build_api(args: &[String]) -> Result<(), Error> {
    let mut args = args.to_vec();
    let out = take_option(&mut args, "-o")?;
    let overrides_path = take_option(&mut args, "--overrides")?;
    let Some(catalog_path) = args.first() else {
        return Err(Error::Io(std::io::Error::other("build-api needs a catalog path")));
    };

    let overrides: HashMap<String, NameOverride> = match overrides_path {
        Some(path) => serde_json::from_str(&read_required(Path::new(&path))?)?,
        None => HashMap::new(),
    };

    let catalog = serde_json::from_str(&read_required(Path::new(catalog_path))?)?;
    let api = build_api(&catalog, &overrides);
    validate_api_contract(&api)?;
    write_output(out.as_deref(), &render_api_json(&api))?;
    println!("modules={}", api.len());
    Ok(())
}

fn cmd_compile(args: &[String]) -> Result<(), Error> {
    let mut args = args.to_vec();
    let api_path = take_option(&mut args, "--api")?
        .ok_or_else(|| Error::Io(std::io::Error::other("compile needs --api <api_aliases.json>")))?;
    let plan_path = take_option(&mut args, "--plan")?;
    let print_plan = take_flag(&mut args, "--print-plan");
    let Some(src_path) = args.first() else {
        return Err(Error::Io(std::io::Error::other("compile needs a source path")));
    };

    let api = parse_api_json(&read_required(Path::new(&api_path))?)?;
    let source = read_required(Path::new(src_path))?;
    let config = Config::from_env();
    let plan = compile_source(&source, &api, &config)?;
    let rendered = plan.render_json();

    match plan_path {
        Some(path) => {
            write_output(Some(&path), &rendered)?;
            if print_plan {
                print!("{rendered}");
            }
        }
        None => print!("{rendered}"),
    }
    Ok(())
}
