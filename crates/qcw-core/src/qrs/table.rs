//! Paged app table request: the column definition body for
//! `POST /qrs/App/table`.

use serde::Serialize;

/// First page of apps, sorted by name.
pub const APP_TABLE_PATH: &str =
    "/qrs/App/table?orderAscending=true&skip=0&sortColumn=name&take=200";

#[derive(Debug, Clone, Serialize)]
pub struct TableRequest {
    pub entity: &'static str,
    pub columns: Vec<TableColumn>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableColumn {
    pub name: &'static str,
    pub column_type: &'static str,
    pub definition: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list: Option<Vec<TableColumn>>,
}

impl TableColumn {
    fn property(name: &'static str) -> Self {
        Self {
            name,
            column_type: "Property",
            definition: name,
            list: None,
        }
    }

    fn list(name: &'static str, definition: &'static str, list: Vec<TableColumn>) -> Self {
        Self {
            name,
            column_type: "List",
            definition,
            list: Some(list),
        }
    }
}

/// Columns the hub asks for when it lists apps.
pub fn app_table_request() -> TableRequest {
    TableRequest {
        entity: "App",
        columns: vec![
            TableColumn::property("id"),
            TableColumn {
                name: "privileges",
                column_type: "Privileges",
                definition: "privileges",
                list: None,
            },
            TableColumn::property("name"),
            TableColumn::property("owner"),
            TableColumn::property("publishTime"),
            TableColumn::list(
                "AppStatus",
                "AppStatus",
                vec![
                    TableColumn::property("statusType"),
                    TableColumn::property("statusValue"),
                    TableColumn::property("id"),
                ],
            ),
            TableColumn::property("stream"),
            TableColumn::list(
                "tags",
                "tag",
                vec![TableColumn::property("name"), TableColumn::property("id")],
            ),
        ],
    }
}

/// Serialized request body.
pub fn app_table_body() -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&app_table_request())
}
