use crate::core::participant::Roster;
use crate::pre::carousel_pars::CarouselPars;
use anyhow::Context;
use std::fs::OpenOptions;
use std::path::Path;

/// read_carousel_pars reads the JSON file and decodes it into the carousel parameters. Missing
/// fields are filled with the built-in defaults, the result is validated.
pub fn read_carousel_pars(filepath: &Path) -> anyhow::Result<CarouselPars> {
    let fh = OpenOptions::new()
        .read(true)
        .open(filepath)
        .context(format!(
            "Failed to open parameter file {}!",
            filepath.display()
        ))?;
    let pars: CarouselPars = serde_json::from_reader(&fh).context(format!(
        "Failed to parse parameter file {}!",
        filepath.display()
    ))?;
    pars.validate().context(format!(
        "Invalid parameters in parameter file {}!",
        filepath.display()
    ))?;
    Ok(pars)
}

/// read_roster reads a JSON array of participants. Every participant needs a unique "id", all
/// other fields are kept as opaque payload.
pub fn read_roster(filepath: &Path) -> anyhow::Result<Roster> {
    let fh = OpenOptions::new()
        .read(true)
        .open(filepath)
        .context(format!("Failed to open roster file {}!", filepath.display()))?;
    let roster: Roster = serde_json::from_reader(&fh).context(format!(
        "Failed to parse roster file {}!",
        filepath.display()
    ))?;
    roster.check_unique_ids().context(format!(
        "Invalid roster in roster file {}!",
        filepath.display()
    ))?;
    Ok(roster)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn write_tmp(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "carousel_read_pars_{}_{}",
            std::process::id(),
            name
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn reads_roster_with_payload() {
        let path = write_tmp(
            "roster.json",
            r#"[{"id": "1", "name": "Marina Alves", "rating": 5}, {"id": "2"}]"#,
        );
        let roster = read_roster(&path).unwrap();
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.get(0).unwrap().payload["name"], "Marina Alves");
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn duplicate_ids_fail_with_file_context() {
        let path = write_tmp("dup.json", r#"[{"id": "1"}, {"id": "1"}]"#);
        let err = read_roster(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("is not unique"));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn reads_partial_pars_and_validates() {
        let path = write_tmp("pars.json", r#"{"max_slots": 10, "spin_duration_ms": 4000.0}"#);
        let pars = read_carousel_pars(&path).unwrap();
        assert_eq!(pars.max_slots, 10);
        assert_eq!(pars.spin_duration_ms, 4000.0);
        std::fs::remove_file(path).ok();

        let path = write_tmp("bad_pars.json", r#"{"base_opacity": 2.0}"#);
        assert!(read_carousel_pars(&path).is_err());
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn missing_file_is_reported() {
        let err = read_roster(Path::new("does/not/exist.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to open roster file"));
    }
}
