//! Chunked publishing: ordered blocks → one Notion page.
//!
//! Notion caps every request at [`BLOCKS_PER_REQUEST`] children, so the block
//! list is cut into fixed-size chunks. Chunk 0 travels with page creation;
//! every later chunk is appended with its own request, strictly in order.
//!
//! There is no retry and no rollback. A rejected create aborts with nothing
//! written; a rejected append aborts and leaves earlier chunks on the page,
//! and the error carries the page id so the caller can find it.

use crate::block::{Block, BLOCKS_PER_REQUEST};
use crate::error::Md2NotionError;
use crate::notion::{DocumentApi, ParentRef};
use crate::progress::UploadProgressCallback;
use tracing::{info, warn};

/// Result of a fully published document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub page_id: String,
    /// Requests sent, including the create.
    pub chunks: usize,
    pub blocks: usize,
}

/// Create a page holding `blocks`, chunking as required.
pub async fn publish(
    blocks: &[Block],
    title: &str,
    parent: &ParentRef,
    api: &dyn DocumentApi,
    progress: Option<&dyn UploadProgressCallback>,
) -> Result<Published, Md2NotionError> {
    let first_len = blocks.len().min(BLOCKS_PER_REQUEST);
    let (first, rest) = blocks.split_at(first_len);
    let total_chunks = 1 + rest.len().div_ceil(BLOCKS_PER_REQUEST);

    if let Some(cb) = progress {
        cb.on_upload_start(blocks.len(), total_chunks);
    }

    info!(
        "Creating page '{}' under {} {} ({} blocks, {} chunks)",
        title, parent.kind, parent.id, blocks.len(), total_chunks
    );
    let page_id = match api.create_page(title, parent, first).await {
        Ok(id) => id,
        Err(source) => {
            warn!(
                "Chunk index 0 (request 1 of {}) failed, page not created: {}",
                total_chunks, source
            );
            if let Some(cb) = progress {
                cb.on_chunk_error(0, total_chunks, &source.to_string());
            }
            return Err(Md2NotionError::PageCreationFailed { source });
        }
    };
    if let Some(cb) = progress {
        cb.on_page_created(&page_id);
        cb.on_chunk_complete(0, total_chunks, first.len());
    }

    let mut committed = first.len();
    for (i, chunk) in rest.chunks(BLOCKS_PER_REQUEST).enumerate() {
        let index = i + 1;
        if let Err(source) = api.append_children(&page_id, chunk).await {
            warn!(
                "Chunk index {} (request {} of {}) failed: {}",
                index,
                index + 1,
                total_chunks,
                source
            );
            if let Some(cb) = progress {
                cb.on_chunk_error(index, total_chunks, &source.to_string());
            }
            return Err(Md2NotionError::ChunkAppendFailed {
                page_id,
                chunk: index,
                total_chunks,
                blocks_committed: committed,
                source,
            });
        }
        committed += chunk.len();
        info!(
            "Uploaded chunk index {} (request {} of {})",
            index,
            index + 1,
            total_chunks
        );
        if let Some(cb) = progress {
            cb.on_chunk_complete(index, total_chunks, chunk.len());
        }
    }

    if let Some(cb) = progress {
        cb.on_upload_complete(&page_id, committed);
    }
    Ok(Published {
        page_id,
        chunks: total_chunks,
        blocks: committed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotionApiError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records calls; fails the create or the N-th append (1-based) on request.
    #[derive(Default)]
    struct Recorder {
        creates: Mutex<Vec<usize>>,
        appends: Mutex<Vec<usize>>,
        fail_create: bool,
        fail_append: Option<usize>,
    }

    #[async_trait]
    impl DocumentApi for Recorder {
        async fn create_page(
            &self,
            _title: &str,
            _parent: &ParentRef,
            children: &[Block],
        ) -> Result<String, NotionApiError> {
            self.creates.lock().unwrap().push(children.len());
            if self.fail_create {
                return Err(NotionApiError::transport("unauthorized"));
            }
            Ok("page-1".into())
        }

        async fn append_children(&self, page_id: &str, children: &[Block]) -> Result<(), NotionApiError> {
            assert_eq!(page_id, "page-1");
            let mut appends = self.appends.lock().unwrap();
            appends.push(children.len());
            if self.fail_append == Some(appends.len()) {
                return Err(NotionApiError::transport("rejected"));
            }
            Ok(())
        }
    }

    fn blocks(n: usize) -> Vec<Block> {
        (0..n).map(|i| Block::Equation(format!("x_{i}"))).collect()
    }

    #[tokio::test]
    async fn small_document_single_request() {
        let api = Recorder::default();
        let out = publish(&blocks(3), "T", &ParentRef::page("p"), &api, None)
            .await
            .unwrap();
        assert_eq!(out.chunks, 1);
        assert_eq!(*api.creates.lock().unwrap(), vec![3]);
        assert!(api.appends.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_document_still_creates_page() {
        let api = Recorder::default();
        let out = publish(&[], "T", &ParentRef::page("p"), &api, None)
            .await
            .unwrap();
        assert_eq!(out.blocks, 0);
        assert_eq!(*api.creates.lock().unwrap(), vec![0]);
    }

    #[tokio::test]
    async fn two_hundred_fifty_blocks() {
        let api = Recorder::default();
        let out = publish(&blocks(250), "T", &ParentRef::database("d"), &api, None)
            .await
            .unwrap();
        assert_eq!(*api.creates.lock().unwrap(), vec![100]);
        assert_eq!(*api.appends.lock().unwrap(), vec![100, 50]);
        assert_eq!(out.chunks, 3);
        assert_eq!(out.blocks, 250);
    }

    #[tokio::test]
    async fn exact_multiple_has_no_empty_chunk() {
        let api = Recorder::default();
        publish(&blocks(200), "T", &ParentRef::page("p"), &api, None)
            .await
            .unwrap();
        assert_eq!(*api.appends.lock().unwrap(), vec![100]);
    }

    #[tokio::test]
    async fn second_append_failure_reports_chunk_two() {
        let api = Recorder {
            fail_append: Some(2),
            ..Default::default()
        };
        let err = publish(&blocks(250), "T", &ParentRef::page("p"), &api, None)
            .await
            .unwrap_err();
        match err {
            Md2NotionError::ChunkAppendFailed {
                page_id,
                chunk,
                total_chunks,
                blocks_committed,
                ..
            } => {
                assert_eq!(page_id, "page-1");
                assert_eq!(chunk, 2);
                assert_eq!(total_chunks, 3);
                assert_eq!(blocks_committed, 200);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn first_append_failure_stops_immediately() {
        let api = Recorder {
            fail_append: Some(1),
            ..Default::default()
        };
        let err = publish(&blocks(350), "T", &ParentRef::page("p"), &api, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Md2NotionError::ChunkAppendFailed { chunk: 1, .. }));
        assert_eq!(api.appends.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn create_failure_sends_no_appends() {
        let api = Recorder {
            fail_create: true,
            ..Default::default()
        };
        let err = publish(&blocks(250), "T", &ParentRef::page("p"), &api, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Md2NotionError::PageCreationFailed { .. }));
        assert!(api.appends.lock().unwrap().is_empty());
    }
}
