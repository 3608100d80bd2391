use super::{ensure_parent_dir, exit_codes};
use crate::cli::args::{AchievementsArgs, AchievementsSub};
use narrator_core::achievements::{Achievement, AchievementStore, JsonFileStore};

pub fn run(args: AchievementsArgs) -> anyhow::Result<i32> {
    ensure_parent_dir(&args.store)?;
    let store = JsonFileStore::open(&args.store);

    match args.cmd {
        AchievementsSub::List => {
            let unlocked = store.unlocked()?;
            for a in Achievement::ALL {
                match unlocked.iter().find(|(u, _)| *u == a) {
                    Some((_, at)) => println!("[x] {:<16} {}", a.name(), at.to_rfc3339()),
                    None => println!("[ ] {}", a.name()),
                }
            }
            eprintln!("unlocked {}/{}", unlocked.len(), Achievement::ALL.len());
        }
        AchievementsSub::Unlock { name } => {
            let a: Achievement = match name.parse() {
                Ok(a) => a,
                Err(e) => {
                    eprintln!("{}", e);
                    return Ok(exit_codes::CONFIG_ERROR);
                }
            };
            if store.unlock(a)? {
                eprintln!("unlocked: {}", a);
            } else {
                eprintln!("note: {} already unlocked", a);
            }
        }
        AchievementsSub::Reset => {
            store.reset()?;
            eprintln!("achievements reset: {}", args.store.display());
        }
    }
    Ok(exit_codes::OK)
}
