//! Build script for flashblk-firmware
//!
//! - Validates storage.toml at compile time
//! - Generates memory.x with the FLASH_FS region reserved for the block device
//! - Generates the storage geometry constants

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// RP2040 flash erase granularity
const ERASE_SIZE: i64 = 4096;

/// Second-stage bootloader at the start of flash
const BOOT2_SIZE: i64 = 0x100;

/// Smallest firmware image area left below the storage region
const MIN_FIRMWARE_SIZE: i64 = 256 * 1024;

/// Validated storage layout
struct StorageLayout {
    flash_size: i64,
    region_size: i64,
    block_size: i64,
    page_size: i64,
}

fn main() {
    let layout = validate_config();
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    setup_linker(&out_dir, &layout);
    write_constants(&out_dir, &layout);

    println!("cargo:rerun-if-changed=build.rs");
}

/// Write memory.x and tell rustc where to find it
fn setup_linker(out_dir: &Path, layout: &StorageLayout) {
    let fs_origin = 0x1000_0000 + layout.flash_size - layout.region_size;
    let firmware_len = layout.flash_size - layout.region_size - BOOT2_SIZE;

    let memory_x = format!(
        "MEMORY {{\n\
        \x20   BOOT2    : ORIGIN = 0x10000000, LENGTH = {boot2:#x}\n\
        \x20   FLASH    : ORIGIN = {flash:#x}, LENGTH = {firmware_len:#x}\n\
        \x20   FLASH_FS : ORIGIN = {fs_origin:#x}, LENGTH = {fs_len:#x}\n\
        \x20   RAM      : ORIGIN = 0x20000000, LENGTH = 256K\n\
        }}\n\
        \n\
        __flash_fs_start = ORIGIN(FLASH_FS);\n\
        __flash_fs_end = ORIGIN(FLASH_FS) + LENGTH(FLASH_FS);\n",
        boot2 = BOOT2_SIZE,
        flash = 0x1000_0000 + BOOT2_SIZE,
        firmware_len = firmware_len,
        fs_origin = fs_origin,
        fs_len = layout.region_size,
    );
    fs::write(out_dir.join("memory.x"), memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
}

/// Generate the geometry constants included by the firmware
fn write_constants(out_dir: &Path, layout: &StorageLayout) {
    let constants = format!(
        "/// Block size presented to the filesystem\n\
        pub const BLOCK_SIZE: usize = {};\n\
        /// Flash erase/program unit\n\
        pub const PAGE_SIZE: usize = {};\n",
        layout.block_size, layout.page_size,
    );
    fs::write(out_dir.join("storage_config.rs"), constants).unwrap();
}

/// Validate storage.toml configuration at compile time
fn validate_config() -> StorageLayout {
    // Re-run if storage.toml changes
    println!("cargo:rerun-if-changed=storage.toml");

    let config_path = Path::new("storage.toml");

    // Check if config file exists
    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: storage.toml not found!                                  ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a storage.toml flash layout file.         ║\n\
            ║  Please create one in the flashblk-firmware directory.           ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    // Read the config file
    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read storage.toml                              ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in storage.toml                      ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();

    let flash_size = require_int(&config, "flash", "size", &mut errors);
    let region_size = require_int(&config, "storage", "region_size", &mut errors);
    let block_size = require_int(&config, "storage", "block_size", &mut errors);
    let page_size = require_int(&config, "storage", "page_size", &mut errors);

    if let (Some(flash_size), Some(region_size), Some(block_size), Some(page_size)) =
        (flash_size, region_size, block_size, page_size)
    {
        let layout = StorageLayout {
            flash_size,
            region_size,
            block_size,
            page_size,
        };
        validate_geometry(&layout, &mut errors);

        if errors.is_empty() {
            println!(
                "cargo:warning=storage.toml validated: {} blocks of {} bytes",
                region_size / block_size,
                block_size
            );
            return layout;
        }
    }

    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: Invalid storage configuration in storage.toml            ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Check the relationships between the layout values
fn validate_geometry(layout: &StorageLayout, errors: &mut Vec<String>) {
    if layout.block_size <= 0 || layout.block_size % 512 != 0 {
        errors.push("block_size must be a positive multiple of 512".to_string());
    }
    if layout.page_size <= 0 || layout.page_size % ERASE_SIZE != 0 {
        errors.push(format!("page_size must be a multiple of {}", ERASE_SIZE));
    }
    if layout.block_size > 0 && layout.page_size % layout.block_size != 0 {
        errors.push("page_size must be a multiple of block_size".to_string());
    }
    if layout.page_size > 0 && (layout.region_size <= 0 || layout.region_size % layout.page_size != 0) {
        errors.push("region_size must be a positive multiple of page_size".to_string());
    }
    if layout.flash_size % ERASE_SIZE != 0 {
        errors.push(format!("flash size must be a multiple of {}", ERASE_SIZE));
    }
    if layout.flash_size - layout.region_size < MIN_FIRMWARE_SIZE {
        errors.push(format!(
            "region_size leaves less than {}KB for firmware",
            MIN_FIRMWARE_SIZE / 1024
        ));
    }
}

/// Fetch a required integer `[section] key`
fn require_int(config: &toml::Value, section: &str, key: &str, errors: &mut Vec<String>) -> Option<i64> {
    match config.get(section).and_then(|s| s.get(key)) {
        Some(toml::Value::Integer(v)) => Some(*v),
        Some(_) => {
            errors.push(format!("[{}] {} must be an integer", section, key));
            None
        }
        None => {
            errors.push(format!("[{}] missing '{}'", section, key));
            None
        }
    }
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
