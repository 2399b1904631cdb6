//! Student persistence over a shared PostgreSQL client.
//!
//! Every method takes a bounded deadline: a query that outlives it gives up
//! cooperatively and surfaces [`Error::StoreDeadline`]. Missing rows on
//! update and delete are classified as not-found rather than silently
//! succeeding.

use core::future::Future;
use core::time::Duration;

use chrono::Utc;
use roster_core::{Error, Student, StudentDraft, StudentId};
use tokio::time::timeout;
use tokio_postgres::{Client, Row};

/// Data access for [`Student`] rows.
pub struct StudentRepository {
    client: Client,
}

impl StudentRepository {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Inserts a new student and returns the stored row.
    pub async fn create(&self, draft: StudentDraft, deadline: Duration) -> Result<Student, Error> {
        let now = Utc::now();
        let row = self
            .bounded(
                deadline,
                self.client.query_one(
                    "INSERT INTO students (first_name, last_name, email, age, grade, created_at, updated_at) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7) \
                     RETURNING id",
                    &[
                        &draft.first_name,
                        &draft.last_name,
                        &draft.email,
                        &draft.age,
                        &draft.grade,
                        &now,
                        &now,
                    ],
                ),
            )
            .await?;

        Ok(Student {
            id: row.try_get(0)?,
            first_name: draft.first_name,
            last_name: draft.last_name,
            email: draft.email,
            age: draft.age,
            grade: draft.grade,
            created_at: now,
            updated_at: now,
        })
    }

    /// Fetches a student by id; `Ok(None)` when no row matches.
    pub async fn get(&self, id: StudentId, deadline: Duration) -> Result<Option<Student>, Error> {
        let row = self
            .bounded(
                deadline,
                self.client.query_opt(
                    "SELECT id, first_name, last_name, email, age, grade, created_at, updated_at \
                     FROM students WHERE id = $1",
                    &[&id],
                ),
            )
            .await?;

        row.as_ref().map(row_to_student).transpose()
    }

    /// Fetches all students, ordered by id.
    pub async fn get_all(&self, deadline: Duration) -> Result<Vec<Student>, Error> {
        let rows = self
            .bounded(
                deadline,
                self.client.query(
                    "SELECT id, first_name, last_name, email, age, grade, created_at, updated_at \
                     FROM students ORDER BY id",
                    &[],
                ),
            )
            .await?;

        rows.iter().map(row_to_student).collect()
    }

    /// Replaces a student's fields and returns the stored row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when no row has the given id.
    pub async fn update(
        &self,
        id: StudentId,
        draft: StudentDraft,
        deadline: Duration,
    ) -> Result<Student, Error> {
        let now = Utc::now();
        let row = self
            .bounded(
                deadline,
                self.client.query_opt(
                    "UPDATE students \
                     SET first_name = $1, last_name = $2, email = $3, age = $4, grade = $5, updated_at = $6 \
                     WHERE id = $7 \
                     RETURNING id, first_name, last_name, email, age, grade, created_at, updated_at",
                    &[
                        &draft.first_name,
                        &draft.last_name,
                        &draft.email,
                        &draft.age,
                        &draft.grade,
                        &now,
                        &id,
                    ],
                ),
            )
            .await?;

        match row {
            Some(row) => row_to_student(&row),
            None => Err(Error::NotFound),
        }
    }

    /// Deletes a student.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when no row has the given id.
    pub async fn delete(&self, id: StudentId, deadline: Duration) -> Result<(), Error> {
        let deleted = self
            .bounded(
                deadline,
                self.client
                    .execute("DELETE FROM students WHERE id = $1", &[&id]),
            )
            .await?;

        if deleted == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    /// Runs `query` under the per-call deadline.
    async fn bounded<T>(
        &self,
        deadline: Duration,
        query: impl Future<Output = Result<T, tokio_postgres::Error>>,
    ) -> Result<T, Error> {
        match timeout(deadline, query).await {
            Ok(result) => result.map_err(Error::from),
            Err(_) => Err(Error::StoreDeadline),
        }
    }
}

fn row_to_student(row: &Row) -> Result<Student, Error> {
    Ok(Student {
        id: row.try_get("id")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        email: row.try_get("email")?,
        age: row.try_get("age")?,
        grade: row.try_get("grade")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
