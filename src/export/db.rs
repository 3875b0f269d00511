use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use log::{debug, info};
use rusqlite::{params, Connection};

use crate::job::ConfiguredJob;

/// Open (or create) the job database and start the dry run save point
pub fn open_db(path: &Path) -> rusqlite::Result<Connection> {
    if !path.exists() {
        info!("Creating new database {}", path.display())
    }
    let conn = Connection::open(path)?;

    static SCHEMA: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/db/schema.sql"));
    conn.execute_batch(SCHEMA)?;

    info!("Creating dry run save point");
    conn.execute("SAVEPOINT dry_run", [])?;
    Ok(conn)
}

/// Insert jobs with their inputs and outputs
///
/// A job already stored under the same name is replaced, so exporting the same graph twice leaves
/// one copy.
pub fn insert_jobs(conn: &Connection, jobs: &[ConfiguredJob]) -> rusqlite::Result<()> {
    let created_at = Utc::now().to_rfc3339();
    let mut delete_io = conn.prepare("DELETE FROM job_io WHERE job_id IN (SELECT id FROM job WHERE name = ?1)")?;
    let mut delete_job = conn.prepare("DELETE FROM job WHERE name = ?1")?;
    let mut insert_job = conn.prepare("INSERT INTO job (name, command, threads, created_at) VALUES (?1, ?2, ?3, ?4)")?;
    let mut insert_io = conn.prepare("INSERT INTO job_io (job_id, direction, path) VALUES (?1, ?2, ?3)")?;

    for job in jobs {
        delete_io.execute([&job.name])?;
        if delete_job.execute([&job.name])? > 0 {
            debug!("Replacing stored job {}", job.name);
        }
        insert_job.execute(params![job.name, job.command, job.threads as i64, created_at])?;
        let id = conn.last_insert_rowid();
        for input in &job.inputs {
            insert_io.execute(params![id, "input", input])?;
        }
        for output in &job.outputs {
            insert_io.execute(params![id, "output", output])?;
        }
    }
    Ok(())
}

fn release_or_rollback(conn: &Connection, dry_run: bool) -> rusqlite::Result<()> {
    match dry_run {
        true => {
            info!("--dry-run set, rolling back database state");
            conn.execute("ROLLBACK TO dry_run", [])?;
        }
        false => {
            info!("--dry-run not set, releasing dry run save point");
            conn.execute("RELEASE dry_run", [])?;
        }
    }
    Ok(())
}

pub fn write_db(jobs: &[ConfiguredJob], path: &Path, dry_run: bool) -> Result<()> {
    let conn = open_db(path).with_context(|| format!("Can't open database {}", path.display()))?;
    insert_jobs(&conn, jobs).context("Inserting jobs")?;
    release_or_rollback(&conn, dry_run)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::sample_jobs;

    fn count(conn: &Connection, table: &str) -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0)).unwrap()
    }

    #[test]
    fn stores_jobs_and_their_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("liqbio.db");
        write_db(&sample_jobs(), &path, false).unwrap();

        let conn = Connection::open(&path).unwrap();
        assert_eq!(count(&conn, "job"), 2);
        assert_eq!(count(&conn, "job_io"), 6);

        let threads: i64 = conn
            .query_row("SELECT threads FROM job WHERE name = ?1", ["manta-somatic/b-a"], |row| row.get(0))
            .unwrap();
        assert_eq!(threads, 4);
        let producer: String = conn
            .query_row(
                "SELECT job.name FROM job JOIN job_io ON job.id = job_io.job_id WHERE direction = 'output' AND path = ?1",
                ["/out/svs/a-DEL.gtf"],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(producer, "svcaller/a-DEL");
    }

    #[test]
    fn dry_run_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("liqbio.db");
        write_db(&sample_jobs(), &path, true).unwrap();

        let conn = Connection::open(&path).unwrap();
        assert_eq!(count(&conn, "job"), 0);
        assert_eq!(count(&conn, "job_io"), 0);
    }

    #[test]
    fn exporting_twice_replaces_jobs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("liqbio.db");
        write_db(&sample_jobs(), &path, false).unwrap();
        write_db(&sample_jobs(), &path, false).unwrap();

        let conn = Connection::open(&path).unwrap();
        assert_eq!(count(&conn, "job"), 2);
        assert_eq!(count(&conn, "job_io"), 6);
    }
}
