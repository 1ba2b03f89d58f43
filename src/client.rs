//! OneDrive API client.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use serde_json::{json, Value};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::error::{DriveError, Result};
use crate::models::{ConflictBehavior, ItemReference};
use crate::multipart::RelatedMultipart;
use crate::transport::{
    Headers, HttpRequest, HttpResponse, Method, QueryParams, ReqwestTransport, RequestOptions,
    Transport,
};
use crate::url::build_url;

/// Drive selector used when no drive has been chosen.
const DEFAULT_DRIVE: &str = "me";

/// Content type sent with metadata requests unless overridden.
const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Maximum bytes written per chunk while streaming a download.
const DOWNLOAD_CHUNK_SIZE: usize = 8000;

/// Client for the OneDrive v1.0 REST API.
///
/// Holds the configuration for every request (access token, content type,
/// default transport options, selected drive, default conflict behavior)
/// and exposes one method per remote operation. Responses are decoded as
/// generic JSON values; the API's response shapes are not modeled here.
pub struct OneDriveClient<T = ReqwestTransport> {
    access_token: String,
    content_type: String,
    default_options: RequestOptions,
    selected_drive: String,
    default_conflict_behavior: ConflictBehavior,
    transport: T,
}

impl OneDriveClient<ReqwestTransport> {
    /// Create a client backed by the default reqwest transport.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self::with_transport(access_token, ReqwestTransport::new())
    }
}

impl<T: Transport> OneDriveClient<T> {
    /// Create a client with an injected transport.
    pub fn with_transport(access_token: impl Into<String>, transport: T) -> Self {
        Self {
            access_token: access_token.into(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            default_options: RequestOptions::new(),
            selected_drive: DEFAULT_DRIVE.to_string(),
            default_conflict_behavior: ConflictBehavior::default(),
            transport,
        }
    }

    // --- Configuration surface ---

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn set_access_token(&mut self, token: impl Into<String>) {
        self.access_token = token.into();
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Set the persistent default content type. Per-request overrides passed
    /// through header maps apply to that request only and never write back
    /// here.
    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.content_type = content_type.into();
    }

    pub fn default_options(&self) -> &RequestOptions {
        &self.default_options
    }

    /// Replace the transport options merged into every request.
    pub fn set_default_options(&mut self, options: RequestOptions) {
        self.default_options = options;
    }

    /// Select the drive used when operations are not given an explicit
    /// drive id. An empty id is silently ignored.
    pub fn select_drive(&mut self, drive_id: &str) {
        if !drive_id.is_empty() {
            self.selected_drive = drive_id.to_string();
        }
    }

    pub fn selected_drive(&self) -> &str {
        &self.selected_drive
    }

    pub fn default_conflict_behavior(&self) -> ConflictBehavior {
        self.default_conflict_behavior
    }

    pub fn set_default_conflict_behavior(&mut self, behavior: ConflictBehavior) {
        self.default_conflict_behavior = behavior;
    }

    // --- Request building ---

    /// Path prefix for a drive: `/drives/{given or selected}`.
    pub fn drive_path(&self, drive_id: Option<&str>) -> String {
        let id = match drive_id {
            Some(id) if !id.is_empty() => id,
            _ => self.selected_drive.as_str(),
        };
        format!("/drives/{}", id)
    }

    /// Headers for an outgoing request: bearer auth and the stored content
    /// type, with caller overrides winning. Header names are normalized to
    /// lowercase so overrides merge predictably.
    pub fn build_headers(&self, overrides: &Headers) -> Headers {
        let mut headers = Headers::new();
        headers.insert(
            "authorization".to_string(),
            format!("bearer {}", self.access_token),
        );
        headers.insert("content-type".to_string(), self.content_type.clone());
        for (name, value) in overrides {
            headers.insert(name.to_ascii_lowercase(), value.clone());
        }
        headers
    }

    /// Transport options for an outgoing request: stored defaults as the
    /// base, per-call overrides winning on key collision.
    pub fn build_options(&self, overrides: &RequestOptions) -> RequestOptions {
        let mut options = self.default_options.clone();
        for (key, value) in overrides {
            options.insert(key.clone(), value.clone());
        }
        options
    }

    // --- Generic dispatch ---

    /// Send a request through the injected transport. Non-2xx statuses are
    /// surfaced as `ApiError` with the response body as the message.
    async fn send(
        &self,
        method: Method,
        url: String,
        query: QueryParams,
        body: Option<Vec<u8>>,
        header_overrides: &Headers,
        option_overrides: &RequestOptions,
    ) -> Result<HttpResponse> {
        let request = HttpRequest {
            method,
            url,
            headers: self.build_headers(header_overrides),
            query,
            body,
        };
        let options = self.build_options(option_overrides);

        let response = self.transport.send(request, &options).await?;
        if !response.is_success() {
            let status = response.status;
            let message = response.text().await.unwrap_or_default();
            return Err(DriveError::ApiError { status, message });
        }
        Ok(response)
    }

    async fn get_json(&self, path: &str, params: QueryParams) -> Result<Value> {
        let response = self
            .send(
                Method::Get,
                build_url(path),
                params,
                None,
                &Headers::new(),
                &RequestOptions::new(),
            )
            .await?;
        response.json().await
    }

    // --- Drive operations ---

    /// List all drives available to the signed-in user.
    pub async fn list_drives(&self, params: QueryParams) -> Result<Value> {
        self.get_json("/drives", params).await
    }

    /// Get a drive by id, or the selected drive if none is given.
    pub async fn get_drive(&self, drive_id: Option<&str>, params: QueryParams) -> Result<Value> {
        self.get_json(&self.drive_path(drive_id), params).await
    }

    /// Get the selected (or personal) drive.
    pub async fn get_default_drive(&self, params: QueryParams) -> Result<Value> {
        self.get_drive(None, params).await
    }

    /// Get the root folder of a drive.
    pub async fn get_drive_root(
        &self,
        drive_id: Option<&str>,
        params: QueryParams,
    ) -> Result<Value> {
        self.get_json(&format!("{}/root", self.drive_path(drive_id)), params)
            .await
    }

    // --- Item operations ---

    /// List children of an item, or of the drive root when no item is
    /// given.
    pub async fn list_children(
        &self,
        item_id: Option<&str>,
        drive_id: Option<&str>,
        params: QueryParams,
    ) -> Result<Value> {
        let item = ItemReference::from_optional_id(item_id)?;
        let path = format!(
            "{}{}/children",
            self.drive_path(drive_id),
            item.path_segment()
        );
        self.get_json(&path, params).await
    }

    /// Get item metadata by id.
    ///
    /// With `with_children`, the `expand` query parameter is set to
    /// `children`; a caller-supplied `expand` value that lacks `children`
    /// gets `,children` appended, one that already mentions it is left
    /// unchanged.
    pub async fn get_item(
        &self,
        item_id: &str,
        with_children: bool,
        mut params: QueryParams,
    ) -> Result<Value> {
        require_id(item_id, "item id")?;

        if with_children {
            match params.get_mut("expand") {
                None => {
                    params.insert("expand".to_string(), "children".to_string());
                }
                Some(expand) if !expand.contains("children") => {
                    expand.push_str(",children");
                }
                Some(_) => {}
            }
        }

        let path = format!("{}/items/{}", self.drive_path(None), item_id);
        self.get_json(&path, params).await
    }

    /// Search within the drive root, or within a given item.
    ///
    /// The search string is trimmed and sent as the `q` query parameter.
    pub async fn search(
        &self,
        query: &str,
        item_id: Option<&str>,
        mut params: QueryParams,
    ) -> Result<Value> {
        let scope = ItemReference::from_optional_id(item_id)?;
        params.insert("q".to_string(), query.trim().to_string());
        let path = format!(
            "{}{}/view.search",
            self.drive_path(None),
            scope.path_segment()
        );
        self.get_json(&path, params).await
    }

    /// List an item's thumbnails.
    pub async fn list_thumbnails(&self, item_id: &str, params: QueryParams) -> Result<Value> {
        require_id(item_id, "item id")?;
        let path = format!("{}/items/{}/thumbnails", self.drive_path(None), item_id);
        self.get_json(&path, params).await
    }

    /// Get a single thumbnail; the thumbnail id defaults to `"0"`.
    pub async fn get_thumbnail(
        &self,
        item_id: &str,
        thumbnail_id: Option<&str>,
        params: QueryParams,
    ) -> Result<Value> {
        require_id(item_id, "item id")?;
        let thumbnail_id = match thumbnail_id {
            None => "0",
            Some("") => {
                return Err(DriveError::InvalidArgument(
                    "thumbnail id must not be empty".to_string(),
                ))
            }
            Some(id) => id,
        };
        let path = format!(
            "{}/items/{}/thumbnails/{}",
            self.drive_path(None),
            item_id,
            thumbnail_id
        );
        self.get_json(&path, params).await
    }

    // --- Download ---

    /// Download an item's content to a local path.
    ///
    /// Fetches the item metadata, follows its `@content.downloadUrl` and
    /// streams the body to `destination`. If the destination is a
    /// directory, the item's name is appended. Returns the final local
    /// path.
    pub async fn download_item<P: AsRef<Path>>(
        &self,
        item_id: &str,
        destination: P,
    ) -> Result<PathBuf> {
        require_id(item_id, "item id")?;
        let destination = destination.as_ref();

        let metadata = self.get_item(item_id, false, QueryParams::new()).await?;
        let download_url = metadata
            .get("@content.downloadUrl")
            .and_then(Value::as_str)
            .ok_or_else(|| DriveError::MissingDownloadUrl(item_id.to_string()))?
            .to_string();

        let final_path = if destination.is_dir() {
            let name = metadata
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or(item_id);
            destination.join(name)
        } else {
            destination.to_path_buf()
        };

        // The download URL is pre-authenticated; no bearer header is sent.
        let request = HttpRequest {
            method: Method::Get,
            url: download_url,
            headers: Headers::new(),
            query: QueryParams::new(),
            body: None,
        };
        let response = self
            .transport
            .send(request, &self.default_options)
            .await?;
        if !response.is_success() {
            let status = response.status;
            let message = response.text().await.unwrap_or_default();
            return Err(DriveError::ApiError { status, message });
        }

        let mut file = File::create(&final_path).await?;
        let mut stream = response.body;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            for piece in chunk.chunks(DOWNLOAD_CHUNK_SIZE) {
                file.write_all(piece).await?;
            }
        }
        file.flush().await?;

        Ok(final_path)
    }

    // --- Mutations ---

    /// Create a folder under the drive root or a parent item.
    pub async fn create_folder(
        &self,
        name: &str,
        parent_id: Option<&str>,
        conflict_behavior: Option<ConflictBehavior>,
        params: QueryParams,
    ) -> Result<Value> {
        let parent = ItemReference::from_optional_id(parent_id)?;
        let behavior = conflict_behavior.unwrap_or(self.default_conflict_behavior);

        let body = json!({
            "name": name,
            "@name.conflictBehavior": behavior.as_str(),
            "folder": {},
        });
        let path = format!(
            "{}{}/children",
            self.drive_path(None),
            parent.path_segment()
        );

        let response = self
            .send(
                Method::Post,
                build_url(&path),
                params,
                Some(body.to_string().into_bytes()),
                &Headers::new(),
                &RequestOptions::new(),
            )
            .await?;
        response.json().await
    }

    /// Upload a local file as a new drive item.
    ///
    /// The item name defaults to the file name; the MIME type is detected
    /// from the path. The body is a two-part `multipart/related` payload
    /// whose content type (with its per-body boundary) applies to this
    /// request only, so the client's stored content type is identical
    /// before and after the call on every exit path.
    pub async fn upload_file<P: AsRef<Path>>(
        &self,
        local_path: P,
        title: Option<&str>,
        parent_id: Option<&str>,
        conflict_behavior: Option<ConflictBehavior>,
    ) -> Result<Value> {
        let local_path = local_path.as_ref();
        if !local_path.is_file() {
            return Err(DriveError::InvalidArgument(format!(
                "source file does not exist: {}",
                local_path.display()
            )));
        }
        let parent = ItemReference::from_optional_id(parent_id)?;
        let behavior = conflict_behavior.unwrap_or(self.default_conflict_behavior);

        let name = match title {
            Some(title) => title.to_string(),
            None => local_path
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string)
                .ok_or_else(|| {
                    DriveError::InvalidArgument(format!(
                        "cannot derive a title from path: {}",
                        local_path.display()
                    ))
                })?,
        };

        let content = tokio::fs::read(local_path).await?;
        let mime_type = mime_guess::from_path(local_path)
            .first_or_octet_stream()
            .to_string();

        let metadata = json!({
            "name": name,
            "@name.conflictBehavior": behavior.as_str(),
            "file": {},
            "@content.sourceUrl": "cid:content",
        });
        let multipart = RelatedMultipart::new(metadata, mime_type, content);

        let mut header_overrides = Headers::new();
        header_overrides.insert("content-type".to_string(), multipart.content_type_header());

        let path = format!(
            "{}{}/children",
            self.drive_path(None),
            parent.path_segment()
        );
        let response = self
            .send(
                Method::Post,
                build_url(&path),
                QueryParams::new(),
                Some(multipart.to_bytes()),
                &header_overrides,
                &RequestOptions::new(),
            )
            .await?;
        response.json().await
    }
}

fn require_id(id: &str, what: &str) -> Result<()> {
    if id.is_empty() {
        return Err(DriveError::InvalidArgument(format!(
            "{} must not be empty",
            what
        )));
    }
    Ok(())
}
