pub use aws_sdk_s3::operation::abort_multipart_upload::builders::AbortMultipartUploadFluentBuilder as AbortRequestBuilder;
pub use aws_sdk_s3::operation::complete_multipart_upload::builders::CompleteMultipartUploadFluentBuilder as CompleteRequestBuilder;
pub use aws_sdk_s3::operation::create_multipart_upload::builders::CreateMultipartUploadFluentBuilder as CreateRequestBuilder;
pub use aws_sdk_s3::operation::delete_objects::builders::DeleteObjectsFluentBuilder as DeleteRequestBuilder;
pub use aws_sdk_s3::operation::get_object::builders::GetObjectFluentBuilder as GetRequestBuilder;
pub use aws_sdk_s3::operation::head_object::builders::HeadObjectFluentBuilder as HeadRequestBuilder;
pub use aws_sdk_s3::operation::put_object::builders::PutObjectFluentBuilder as PutRequestBuilder;
pub use aws_sdk_s3::operation::upload_part::builders::UploadPartFluentBuilder as UploadPartRequestBuilder;

mod abort;
pub use abort::{AbortRequest, SendAbortUpload};

mod complete;
pub use complete::{CompleteRequest, CompletedUpload, SendCompleteUpload};

mod create;
pub use create::{CreateRequest, SendCreateUpload};

mod delete;
pub use delete::DeleteRequest;

mod head;
pub use head::{HeadRequest, ObjectHead};

mod presign;
pub use presign::{Operation, PresignRequest, PresignedUrl, ResponseOverrides};

mod put;
pub use put::PutRequest;

mod upload_part;
pub use upload_part::{SendUploadPart, UploadPartRequest};

/// Add additional properties to the request objects being sent.
pub trait RequestBuilder: Send + Sync {
    /// Set additional properties on [`CreateRequestBuilder`] beyond what
    /// [`CreateRequest`] provides.
    fn with_create_builder(&self, builder: CreateRequestBuilder) -> CreateRequestBuilder {
        builder
    }

    /// Set additional properties on [`UploadPartRequestBuilder`] beyond what
    /// [`UploadPartRequest`] provides.
    fn with_upload_part_builder(
        &self,
        builder: UploadPartRequestBuilder,
    ) -> UploadPartRequestBuilder {
        builder
    }

    /// Set additional properties on [`CompleteRequestBuilder`] beyond what
    /// [`CompleteRequest`] provides.
    fn with_complete_builder(&self, builder: CompleteRequestBuilder) -> CompleteRequestBuilder {
        builder
    }

    /// Set additional properties on [`AbortRequestBuilder`] beyond what
    /// [`AbortRequest`] provides.
    fn with_abort_builder(&self, builder: AbortRequestBuilder) -> AbortRequestBuilder {
        builder
    }

    /// Set additional properties on [`PutRequestBuilder`] beyond what
    /// [`PutRequest`] provides.
    ///
    /// This is also applied to write-signed URLs.
    fn with_put_builder(&self, builder: PutRequestBuilder) -> PutRequestBuilder {
        builder
    }

    /// Set additional properties on [`DeleteRequestBuilder`] beyond what
    /// [`DeleteRequest`] provides.
    fn with_delete_builder(&self, builder: DeleteRequestBuilder) -> DeleteRequestBuilder {
        builder
    }

    /// Set additional properties on [`HeadRequestBuilder`] beyond what
    /// [`HeadRequest`] provides.
    fn with_head_builder(&self, builder: HeadRequestBuilder) -> HeadRequestBuilder {
        builder
    }

    /// Set additional properties on [`GetRequestBuilder`] before a read-signed
    /// URL is produced from it.
    fn with_get_builder(&self, builder: GetRequestBuilder) -> GetRequestBuilder {
        builder
    }
}

/// Default implementation of [`RequestBuilder`] that doesn't modify the request
/// object at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRequestBuilder;
impl RequestBuilder for DefaultRequestBuilder {}
