use chrono::Local;
use wakeful_core::next_occurrence;
use wakeful_core::storage::{AlarmStore, FileStore};

pub fn run(id: Option<u32>) -> Result<(), Box<dyn std::error::Error>> {
    let store = FileStore::open_default()?;
    let now = Local::now().naive_local();

    match id {
        Some(id) => {
            let def = store
                .load_all()?
                .into_iter()
                .find(|a| a.id == id)
                .ok_or_else(|| format!("no alarm with id {id}"))?;
            println!("{}", next_occurrence(&def, now));
        }
        None => {
            let mut active = store.load_active()?;
            if active.is_empty() {
                println!("no active alarms");
                return Ok(());
            }
            active.sort_by_key(|a| next_occurrence(a, now));
            for def in active {
                println!("{:>4}  {}  {}", def.id, next_occurrence(&def, now), def.title);
            }
        }
    }
    Ok(())
}
