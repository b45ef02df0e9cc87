use std::cell::RefCell;
use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use speculate2::speculate;
use timekeeper::models::*;
use timekeeper::storage::{FileVault, ProjectStorage};
use timekeeper::tracking::*;
use timekeeper::{Result, TimekeeperError};

/// Keeps saved projects in memory and counts saves.
#[derive(Default)]
struct MemoryStorage {
    projects: RefCell<HashMap<String, Project>>,
    saves: RefCell<usize>,
}

impl ProjectStorage for MemoryStorage {
    fn load(&self, project_name: &str) -> Result<Project> {
        self.projects
            .borrow()
            .get(project_name)
            .cloned()
            .ok_or_else(|| TimekeeperError::ProjectNotFound(project_name.to_string()))
    }

    fn save(&self, project: &Project) -> Result<()> {
        *self.saves.borrow_mut() += 1;
        self.projects
            .borrow_mut()
            .insert(project.name.clone(), project.clone());
        Ok(())
    }

    fn exists(&self, project_name: &str) -> bool {
        self.projects.borrow().contains_key(project_name)
    }
}

fn at(hour: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2023, 1, 2)
        .expect("valid date")
        .and_hms_opt(hour, min, 0)
        .expect("valid time")
}

fn create_test_project() -> Project {
    let mut project = Project::new("acme");
    project.add_role(Role::new("dev", 50)).expect("Failed to add role");
    project.add_role(Role::new("pm", 80)).expect("Failed to add role");
    project
}

speculate! {
    before {
        let storage = MemoryStorage::default();
        let mut project = create_test_project();
    }

    describe "toggle" {
        it "starts tracking a role with no entries" {
            let outcome = ToggleTracking::new(&storage)
                .execute_at(&mut project, "dev", at(9, 0))
                .expect("Failed to toggle");

            assert_eq!(outcome.role, "dev");
            assert_eq!(outcome.transition, Transition::Started("2023-01-02 09:00:00.000000".to_string()));
            assert_eq!(outcome.choice, RoleChoice::Requested);
            assert!(outcome.notice().is_none());
            assert_eq!(outcome.to_string(), "Started tracking at 2023-01-02 09:00:00.000000");
            assert!(project.is_tracking("dev"));
        }

        it "stops the same entry on the second call" {
            let toggle = ToggleTracking::new(&storage);
            toggle.execute_at(&mut project, "dev", at(9, 0)).expect("Failed to start");
            let outcome = toggle.execute_at(&mut project, "dev", at(10, 0)).expect("Failed to stop");

            assert_eq!(outcome.transition, Transition::Stopped("2023-01-02 10:00:00.000000".to_string()));
            assert_eq!(project.time_entries.len(), 1);
            assert!(project.time_entries[0].is_closed());
            assert!(!project.is_tracking("dev"));
        }

        it "leaves one closed entry with end after start using the real clock" {
            let toggle = ToggleTracking::new(&storage);
            toggle.execute(&mut project, "dev").expect("Failed to start");
            std::thread::sleep(std::time::Duration::from_millis(5));
            toggle.execute(&mut project, "dev").expect("Failed to stop");

            assert_eq!(project.time_entries.len(), 1);
            let entry = &project.time_entries[0];
            assert!(entry.is_closed());
            let start = entry.started_at().expect("start parses");
            let end = entry.ended_at().expect("end parses").expect("entry closed");
            assert!(end > start);
        }

        it "never opens a second entry for the same role" {
            let toggle = ToggleTracking::new(&storage);
            for hour in 9..15 {
                toggle.execute_at(&mut project, "dev", at(hour, 0)).expect("Failed to toggle");
                let open = project.time_entries.iter().filter(|e| e.is_open()).count();
                assert!(open <= 1);
            }
            assert_eq!(project.time_entries.len(), 3);
        }

        it "tracks roles independently" {
            let toggle = ToggleTracking::new(&storage);
            toggle.execute_at(&mut project, "dev", at(9, 0)).expect("Failed to toggle");
            toggle.execute_at(&mut project, "pm", at(9, 30)).expect("Failed to toggle");

            assert!(project.is_tracking("dev"));
            assert!(project.is_tracking("pm"));

            toggle.execute_at(&mut project, "dev", at(10, 0)).expect("Failed to toggle");
            assert!(!project.is_tracking("dev"));
            assert!(project.is_tracking("pm"));
        }

        it "uses the default role when no role is given" {
            let outcome = ToggleTracking::new(&storage)
                .execute_at(&mut project, "", at(9, 0))
                .expect("Failed to toggle");

            assert_eq!(outcome.role, "dev");
            assert_eq!(outcome.choice, RoleChoice::Unspecified);
            assert_eq!(
                outcome.notice(),
                Some("No role given. Using default role \"dev\".".to_string())
            );
        }

        it "falls back to the default role for an unknown role" {
            let outcome = ToggleTracking::new(&storage)
                .execute_at(&mut project, "qa", at(9, 0))
                .expect("Failed to toggle");

            assert_eq!(outcome.role, "dev");
            assert_eq!(outcome.choice, RoleChoice::Fallback("qa".to_string()));
            assert_eq!(
                outcome.notice(),
                Some("Role \"qa\" not found in project \"acme\". Defaulted to role \"dev\".".to_string())
            );
            assert_eq!(project.time_entries[0].role_name, "dev");
        }

        it "fails when the project has no roles" {
            let mut empty = Project::new("empty");
            let err = ToggleTracking::new(&storage)
                .execute_at(&mut empty, "dev", at(9, 0))
                .unwrap_err();

            assert!(matches!(err, TimekeeperError::NoRoles(_)));
            assert_eq!(*storage.saves.borrow(), 0);
        }

        it "persists the project after each toggle" {
            let toggle = ToggleTracking::new(&storage);
            toggle.execute_at(&mut project, "dev", at(9, 0)).expect("Failed to toggle");
            toggle.execute_at(&mut project, "dev", at(10, 0)).expect("Failed to toggle");

            assert_eq!(*storage.saves.borrow(), 2);
            assert_eq!(storage.load("acme").expect("Failed to load"), project);
        }

        it "round trips through a file vault" {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
            let vault = FileVault::open(dir.path()).expect("Failed to open vault");

            ToggleTracking::new(&vault)
                .execute_at(&mut project, "dev", at(9, 0))
                .expect("Failed to toggle");

            let mut reloaded = vault.load("acme").expect("Failed to load");
            assert!(reloaded.is_tracking("dev"));

            ToggleTracking::new(&vault)
                .execute_at(&mut reloaded, "dev", at(11, 0))
                .expect("Failed to toggle");

            let reloaded = vault.load("acme").expect("Failed to load");
            assert_eq!(reloaded.time_entries.len(), 1);
            assert_eq!(reloaded.time_entries[0].end_time, "2023-01-02 11:00:00.000000");
        }
    }

    describe "start_tracking" {
        it "refuses to open a second entry" {
            start_tracking(&mut project, "dev", at(9, 0)).expect("Failed to start");
            let err = start_tracking(&mut project, "dev", at(9, 5)).unwrap_err();

            assert!(matches!(err, TimekeeperError::PreviousTimeEntryOpen(role) if role == "dev"));
            assert_eq!(project.time_entries.len(), 1);
        }
    }

    describe "stop_tracking" {
        it "refuses to stop a role with no entries" {
            let err = stop_tracking(&mut project, "dev", at(9, 0)).unwrap_err();
            assert!(matches!(err, TimekeeperError::PreviousTimeEntryClosed(role) if role == "dev"));
        }

        it "refuses to stop an already closed entry" {
            start_tracking(&mut project, "dev", at(9, 0)).expect("Failed to start");
            stop_tracking(&mut project, "dev", at(10, 0)).expect("Failed to stop");

            let err = stop_tracking(&mut project, "dev", at(11, 0)).unwrap_err();
            assert!(matches!(err, TimekeeperError::PreviousTimeEntryClosed(_)));
            assert_eq!(project.time_entries[0].end_time, "2023-01-02 10:00:00.000000");
        }
    }

    describe "status_line" {
        it "reports no timer for a fresh project" {
            assert_eq!(status_line(&project), "No timer running.");
        }

        it "reports the running role" {
            start_tracking(&mut project, "pm", at(9, 0)).expect("Failed to start");
            assert_eq!(
                status_line(&project),
                "Timer running for role \"pm\" since 2023-01-02 09:00:00.000000."
            );
        }
    }
}
