//! Instructors, vehicles and classrooms: the resources a lesson can hold.

use chrono::Utc;

use gear_core::entities::{Classroom, Instructor, Vehicle};
use gear_core::enums::{AuditAction, EntityType};
use gear_core::ids::{PREFIX_CLASSROOM, PREFIX_INSTRUCTOR, PREFIX_VEHICLE};

use crate::error::DatabaseError;
use crate::helpers::{collect_rows, get_bool, get_opt_string, get_opt_u32, parse_datetime, ts};
use crate::service::GearService;

const INSTRUCTOR_COLS: &str = "id, name, email, phone, active, created_at";
const VEHICLE_COLS: &str = "id, name, plate_number, transmission, active, created_at";
const CLASSROOM_COLS: &str = "id, name, location, capacity, active, created_at";

fn row_to_instructor(row: &libsql::Row) -> Result<Instructor, DatabaseError> {
    Ok(Instructor {
        id: row.get(0)?,
        name: row.get(1)?,
        email: get_opt_string(row, 2)?,
        phone: get_opt_string(row, 3)?,
        active: get_bool(row, 4)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

fn row_to_vehicle(row: &libsql::Row) -> Result<Vehicle, DatabaseError> {
    Ok(Vehicle {
        id: row.get(0)?,
        name: row.get(1)?,
        plate_number: get_opt_string(row, 2)?,
        transmission: get_opt_string(row, 3)?,
        active: get_bool(row, 4)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

fn row_to_classroom(row: &libsql::Row) -> Result<Classroom, DatabaseError> {
    Ok(Classroom {
        id: row.get(0)?,
        name: row.get(1)?,
        location: get_opt_string(row, 2)?,
        capacity: get_opt_u32(row, 3)?,
        active: get_bool(row, 4)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

fn require_name(name: &str) -> Result<(), DatabaseError> {
    if name.trim().is_empty() {
        return Err(DatabaseError::Validation("name is required".into()));
    }
    Ok(())
}

impl GearService {
    pub async fn create_instructor(
        &self,
        name: &str,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Instructor, DatabaseError> {
        require_name(name)?;
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_INSTRUCTOR).await?;
        self.db()
            .conn()
            .execute(
                &format!("INSERT INTO instructors ({INSTRUCTOR_COLS}) VALUES (?1, ?2, ?3, ?4, 1, ?5)"),
                libsql::params![id.as_str(), name, email, phone, ts(now)],
            )
            .await?;
        self.audit(EntityType::Instructor, &id, AuditAction::Created, None, now)
            .await?;
        Ok(Instructor {
            id,
            name: name.to_string(),
            email: email.map(String::from),
            phone: phone.map(String::from),
            active: true,
            created_at: now,
        })
    }

    pub async fn get_instructor(&self, id: &str) -> Result<Instructor, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {INSTRUCTOR_COLS} FROM instructors WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_instructor(&row)
    }

    pub async fn list_instructors(&self, include_inactive: bool) -> Result<Vec<Instructor>, DatabaseError> {
        let filter = if include_inactive { "" } else { "WHERE active = 1" };
        let rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {INSTRUCTOR_COLS} FROM instructors {filter} ORDER BY name"),
                (),
            )
            .await?;
        collect_rows(rows, row_to_instructor).await
    }

    pub async fn create_vehicle(
        &self,
        name: &str,
        plate_number: Option<&str>,
        transmission: Option<&str>,
    ) -> Result<Vehicle, DatabaseError> {
        require_name(name)?;
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_VEHICLE).await?;
        self.db()
            .conn()
            .execute(
                &format!("INSERT INTO vehicles ({VEHICLE_COLS}) VALUES (?1, ?2, ?3, ?4, 1, ?5)"),
                libsql::params![id.as_str(), name, plate_number, transmission, ts(now)],
            )
            .await?;
        self.audit(EntityType::Vehicle, &id, AuditAction::Created, None, now)
            .await?;
        Ok(Vehicle {
            id,
            name: name.to_string(),
            plate_number: plate_number.map(String::from),
            transmission: transmission.map(String::from),
            active: true,
            created_at: now,
        })
    }

    pub async fn list_vehicles(&self, include_inactive: bool) -> Result<Vec<Vehicle>, DatabaseError> {
        let filter = if include_inactive { "" } else { "WHERE active = 1" };
        let rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {VEHICLE_COLS} FROM vehicles {filter} ORDER BY name"),
                (),
            )
            .await?;
        collect_rows(rows, row_to_vehicle).await
    }

    pub async fn create_classroom(
        &self,
        name: &str,
        location: Option<&str>,
        capacity: Option<u32>,
    ) -> Result<Classroom, DatabaseError> {
        require_name(name)?;
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_CLASSROOM).await?;
        self.db()
            .conn()
            .execute(
                &format!("INSERT INTO classrooms ({CLASSROOM_COLS}) VALUES (?1, ?2, ?3, ?4, 1, ?5)"),
                libsql::params![id.as_str(), name, location, capacity.map(i64::from), ts(now)],
            )
            .await?;
        self.audit(EntityType::Classroom, &id, AuditAction::Created, None, now)
            .await?;
        Ok(Classroom {
            id,
            name: name.to_string(),
            location: location.map(String::from),
            capacity,
            active: true,
            created_at: now,
        })
    }

    pub async fn list_classrooms(&self, include_inactive: bool) -> Result<Vec<Classroom>, DatabaseError> {
        let filter = if include_inactive { "" } else { "WHERE active = 1" };
        let rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {CLASSROOM_COLS} FROM classrooms {filter} ORDER BY name"),
                (),
            )
            .await?;
        collect_rows(rows, row_to_classroom).await
    }

    /// Deactivate an instructor, vehicle or classroom. Existing lessons keep it.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` for an entity type that is not a
    /// resource, or `DatabaseError::NoResult` when the id is unknown.
    pub async fn deactivate_resource(
        &self,
        entity_type: EntityType,
        id: &str,
    ) -> Result<(), DatabaseError> {
        let table = match entity_type {
            EntityType::Instructor => "instructors",
            EntityType::Vehicle => "vehicles",
            EntityType::Classroom => "classrooms",
            other => {
                return Err(DatabaseError::InvalidState(format!(
                    "{other} is not a schedulable resource"
                )));
            }
        };
        let changed = self
            .db()
            .conn()
            .execute(&format!("UPDATE {table} SET active = 0 WHERE id = ?1"), [id])
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        self.audit(
            entity_type,
            id,
            AuditAction::Updated,
            Some(serde_json::json!({ "active": false })),
            Utc::now(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::test_service;

    #[tokio::test]
    async fn deactivated_resources_drop_out_of_lists() {
        let svc = test_service().await;
        let ins = svc.create_instructor("Pat", None, None).await.unwrap();
        svc.create_instructor("Alex", Some("alex@example.com"), None)
            .await
            .unwrap();
        svc.deactivate_resource(EntityType::Instructor, &ins.id)
            .await
            .unwrap();

        let active = svc.list_instructors(false).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Alex");
        assert_eq!(svc.list_instructors(true).await.unwrap().len(), 2);
        assert!(!svc.get_instructor(&ins.id).await.unwrap().active);
    }

    #[tokio::test]
    async fn vehicles_and_classrooms() {
        let svc = test_service().await;
        svc.create_vehicle("Corolla", Some("ABCD 123"), Some("automatic"))
            .await
            .unwrap();
        let room = svc
            .create_classroom("Room A", Some("Main St"), Some(24))
            .await
            .unwrap();
        assert_eq!(svc.list_vehicles(false).await.unwrap().len(), 1);
        assert_eq!(svc.list_classrooms(false).await.unwrap()[0].capacity, Some(24));
        assert_eq!(room.capacity, Some(24));
    }

    #[tokio::test]
    async fn only_resources_can_be_deactivated() {
        let svc = test_service().await;
        let err = svc
            .deactivate_resource(EntityType::Lead, "led-1")
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidState(_)));
        assert!(matches!(
            svc.deactivate_resource(EntityType::Vehicle, "veh-missing").await,
            Err(DatabaseError::NoResult)
        ));
    }
}
