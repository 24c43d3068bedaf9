use std::error::Error;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

fn cipherchain_command() -> Command {
    Command::new(env!("CARGO_BIN_EXE_cipherchain"))
}

fn run(dir: &Path, args: &[&str]) -> Result<Output, Box<dyn Error>> {
    Ok(cipherchain_command()
        .arg("--dir")
        .arg(dir)
        .args(args)
        .output()?)
}

#[test]
fn cli_end_to_end_flow() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let saves = dir.path().join("saves");
    let input = dir.path().join("letter.txt");
    let cipher = dir.path().join("letter.enc");
    let recovered = dir.path().join("letter.out");

    fs::write(&input, b"Dear reader,\n\tthis letter travels through every model.\n")?;

    let new = run(&saves, &["new", "letters", "--seed", "77", "--swap", "section-random", "--section-amount", "6"])?;
    assert!(
        new.status.success(),
        "new command failed: {}",
        String::from_utf8_lossy(&new.stderr)
    );
    assert!(String::from_utf8(new.stdout)?.contains("Created chain letters with 3 models"));
    assert!(saves.join("letters.json").is_file());

    let encrypt = run(&saves, &["encrypt", "letters", input.to_str().unwrap(), cipher.to_str().unwrap()])?;
    assert!(
        encrypt.status.success(),
        "encrypt command failed: {}",
        String::from_utf8_lossy(&encrypt.stderr)
    );
    assert_ne!(fs::read(&cipher)?, fs::read(&input)?);

    let decrypt = run(&saves, &["decrypt", "letters", cipher.to_str().unwrap(), recovered.to_str().unwrap()])?;
    assert!(
        decrypt.status.success(),
        "decrypt command failed: {}",
        String::from_utf8_lossy(&decrypt.stderr)
    );
    assert_eq!(fs::read(&recovered)?, fs::read(&input)?, "decrypted file must match input");

    let info = run(&saves, &["info", "letters"])?;
    let info_stdout = String::from_utf8(info.stdout)?;
    assert!(info_stdout.contains("Cipher chain with 3 models"));
    assert!(info_stdout.contains("setting section-random"));

    Ok(())
}

#[test]
fn new_refuses_existing_chain_without_overwrite() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;

    assert!(run(dir.path(), &["new", "twice", "--seed", "1"])?.status.success());

    let again = run(dir.path(), &["new", "twice", "--seed", "2"])?;
    assert!(!again.status.success());
    assert!(String::from_utf8_lossy(&again.stderr).contains("already exists"));

    let overwrite = run(dir.path(), &["new", "twice", "--seed", "2", "--overwrite"])?;
    assert!(overwrite.status.success());
    Ok(())
}

#[test]
fn negative_shift_and_dropped_models() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;

    let new = run(dir.path(), &["new", "shift-only", "--rotors", "0", "--shift", "-7", "--no-swap"])?;
    assert!(
        new.status.success(),
        "new command failed: {}",
        String::from_utf8_lossy(&new.stderr)
    );

    let info = String::from_utf8(run(dir.path(), &["info", "shift-only"])?.stdout)?;
    assert!(info.contains("Cipher chain with 1 models"));
    assert!(info.contains("amount -7"));
    Ok(())
}

#[test]
fn chain_without_models_is_rejected() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let output = run(dir.path(), &["new", "empty", "--rotors", "0", "--no-shift", "--no-swap"])?;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("at least one model"));
    Ok(())
}

#[test]
fn missing_chain_reports_error() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("in.txt");
    fs::write(&input, b"data")?;

    let output = run(
        dir.path(),
        &["encrypt", "ghost", input.to_str().unwrap(), dir.path().join("out").to_str().unwrap()],
    )?;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("Error:"));
    Ok(())
}

#[test]
fn version_flag_prints_build_information() -> Result<(), Box<dyn Error>> {
    let output = cipherchain_command().arg("--version").output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.starts_with("cipherchain "));
    assert!(stdout.contains("build"));
    Ok(())
}
