use std::sync::Arc;

use serde::Serialize;

use crate::application::ports::{RecordRepository, RepositoryError, Row};
use crate::domain::PollutionRecord;

/// Canned SQL selected by keyword match against a natural-language
/// question. This is deliberately not a query planner: the set is closed
/// and the first template whose trigger appears in the lowercased question
/// wins, in the order listed here.
struct QueryTemplate {
    triggers: &'static [&'static str],
    sql: &'static str,
}

const QUERY_TEMPLATES: [QueryTemplate; 7] = [
    QueryTemplate {
        triggers: &["recent", "latest"],
        sql: "SELECT * FROM pollution_records ORDER BY created_at DESC LIMIT 10",
    },
    QueryTemplate {
        triggers: &["count", "total"],
        sql: "SELECT COUNT(*) AS total_records, \
              COUNT(DISTINCT pollution_type) AS unique_pollution_types, \
              COUNT(CASE WHEN latitude IS NOT NULL THEN 1 END) AS records_with_location \
              FROM pollution_records",
    },
    QueryTemplate {
        triggers: &["type", "pollution"],
        sql: "SELECT pollution_type, COUNT(*) AS count, \
              CAST(AVG(CASE \
                  WHEN severity_level = 'low' THEN 1 \
                  WHEN severity_level = 'medium' THEN 2 \
                  WHEN severity_level = 'high' THEN 3 \
                  WHEN severity_level = 'critical' THEN 4 \
                  ELSE 2 END) AS REAL) AS avg_severity \
              FROM pollution_records \
              WHERE pollution_type IS NOT NULL AND pollution_type != '' \
              GROUP BY pollution_type ORDER BY count DESC",
    },
    QueryTemplate {
        triggers: &["location", "address"],
        sql: "SELECT address, pollution_type, created_at FROM pollution_records \
              WHERE address IS NOT NULL ORDER BY created_at DESC LIMIT 20",
    },
    QueryTemplate {
        triggers: &["water"],
        sql: "SELECT * FROM pollution_records WHERE pollution_type LIKE '%water%' \
              ORDER BY created_at DESC LIMIT 20",
    },
    QueryTemplate {
        triggers: &["air"],
        sql: "SELECT * FROM pollution_records WHERE pollution_type LIKE '%air%' \
              ORDER BY created_at DESC LIMIT 20",
    },
    QueryTemplate {
        triggers: &["severe", "critical", "high"],
        sql: "SELECT * FROM pollution_records WHERE severity_level IN ('high', 'critical') \
              ORDER BY created_at DESC LIMIT 20",
    },
];

const DEFAULT_TEMPLATE: &str = "SELECT id, timestamp, pollution_type, address, severity_level \
                                FROM pollution_records ORDER BY created_at DESC LIMIT 50";

/// Persistence plus the natural-language query surface over the single
/// `pollution_records` table.
pub struct RecordService {
    repository: Arc<dyn RecordRepository>,
}

/// SQL text used and its result rows. On failure `sql_query` carries an
/// `ERROR: ...` string and `result` is empty; `query` never errors.
#[derive(Debug, Clone, Serialize)]
pub struct QueryOutcome {
    pub sql_query: String,
    pub result: Vec<Row>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PollutionTypeCount {
    pub pollution_type: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreStatistics {
    pub total_records: i64,
    pub pollution_types: Vec<PollutionTypeCount>,
    pub records_with_location: i64,
    pub recent_activity: i64,
}

impl RecordService {
    pub fn new(repository: Arc<dyn RecordRepository>) -> Self {
        Self { repository }
    }

    /// Insert one record and return its identifier.
    pub async fn add(&self, record: &PollutionRecord) -> Result<i64, RepositoryError> {
        let id = self.repository.insert(record).await?;
        tracing::info!(record_id = id, pollution_type = %record.pollution_type, "Record stored");
        Ok(id)
    }

    /// Answer a natural-language question via the canned template table.
    pub async fn query(&self, question: &str) -> QueryOutcome {
        let sql = select_template(question);
        tracing::debug!(question, sql, "Running canned query");

        match self.repository.select(sql).await {
            Ok(result) => QueryOutcome {
                sql_query: sql.to_string(),
                result,
            },
            Err(e) => {
                tracing::error!(error = %e, "Canned query failed");
                QueryOutcome {
                    sql_query: format!("ERROR: {}", e),
                    result: Vec::new(),
                }
            }
        }
    }

    pub async fn get_statistics(&self) -> Result<StoreStatistics, RepositoryError> {
        let total_records = self
            .first_count("SELECT COUNT(*) AS n FROM pollution_records")
            .await?;

        let type_rows = self
            .repository
            .select(
                "SELECT pollution_type, COUNT(*) AS count FROM pollution_records \
                 WHERE pollution_type IS NOT NULL GROUP BY pollution_type ORDER BY count DESC",
            )
            .await?;

        let pollution_types = type_rows
            .into_iter()
            .map(|row| PollutionTypeCount {
                pollution_type: row
                    .get("pollution_type")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
                count: row.get("count").and_then(|v| v.as_i64()).unwrap_or(0),
            })
            .collect();

        let records_with_location = self
            .first_count(
                "SELECT COUNT(*) AS n FROM pollution_records \
                 WHERE latitude IS NOT NULL AND longitude IS NOT NULL",
            )
            .await?;

        let recent_activity = self.repository.count_created_since(7).await?;

        Ok(StoreStatistics {
            total_records,
            pollution_types,
            records_with_location,
            recent_activity,
        })
    }

    /// Delete records older than `days` days; returns the count removed.
    pub async fn cleanup_old_records(&self, days: i64) -> Result<u64, RepositoryError> {
        let deleted = self.repository.delete_older_than(days).await?;
        tracing::info!(deleted, days, "Old records cleaned up");
        Ok(deleted)
    }

    async fn first_count(&self, sql: &str) -> Result<i64, RepositoryError> {
        let rows = self.repository.select(sql).await?;
        Ok(rows
            .first()
            .and_then(|row| row.get("n"))
            .and_then(|v| v.as_i64())
            .unwrap_or(0))
    }
}

fn select_template(question: &str) -> &'static str {
    let question = question.to_lowercase();

    for template in &QUERY_TEMPLATES {
        if template.triggers.iter().any(|t| question.contains(t)) {
            return template.sql;
        }
    }

    DEFAULT_TEMPLATE
}
